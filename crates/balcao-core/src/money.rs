//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: rust_decimal                                         │
//! │    2.000 × 25.50 = 51.00, exactly, every time                       │
//! │                                                                     │
//! │  Quantities are fractional (1.5 kg of flour), so plain integer      │
//! │  cents are not enough here: subtotal = quantity × unit price must   │
//! │  be exact for arbitrary decimal quantities, and reversing a sale    │
//! │  must restore balances bit-for-bit.                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use balcao_core::money::Money;
//!
//! let price: Money = "25.50".parse().unwrap();
//! let total = price.times("2".parse().unwrap());
//! assert_eq!(total.to_string(), "51.00");
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary value backed by an exact decimal.
///
/// ## Design Decisions
/// - **Signed**: reversal arithmetic may legitimately drive a customer
///   balance below zero; the engine records the result without clamping.
/// - **Single-field tuple struct**: zero-cost wrapper over `Decimal`.
/// - **Transparent serde**: serializes as the bare decimal string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    ///
    /// A product price must pass this check before it can be captured
    /// into a sale line.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiplies by a (possibly fractional) quantity.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let unit_price: Money = "25.50".parse().unwrap();
    /// let subtotal = unit_price.times("1.5".parse().unwrap());
    /// assert_eq!(subtotal, "38.25".parse().unwrap());
    /// ```
    #[inline]
    pub fn times(&self, quantity: Decimal) -> Money {
        Money(self.0 * quantity)
    }

    /// Divides by a count, rounding half-up to 2 decimal places.
    ///
    /// Used for averages (ticket médio); exact division does not exist
    /// for arbitrary counts, so the rounding is explicit here and
    /// nowhere else.
    pub fn divided_by(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let raw = self.0 / Decimal::from(count);
        Money(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display rounds half-up to cents; storage goes through
        // `amount()` instead and keeps full precision.
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Money(Decimal::from_str(s)?))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}
