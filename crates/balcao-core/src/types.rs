//! # Domain Types
//!
//! Core domain types for the Balcão back end.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐         │
//! │  │    Product    │   │     Sale      │   │    Customer    │         │
//! │  │  ───────────  │   │  ───────────  │   │  ────────────  │         │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)     │         │
//! │  │  sale_price   │   │  total_value  │   │  credit_limit  │         │
//! │  │  stock_qty    │   │  items[]      │   │  debit_balance │         │
//! │  └───────────────┘   └───────────────┘   └────────────────┘         │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐         │
//! │  │   SaleItem    │   │ PaymentMethod │   │  CreditPolicy  │         │
//! │  │  ───────────  │   │  ───────────  │   │  ────────────  │         │
//! │  │  unit_price   │   │  Cash Debit   │   │  grace period  │         │
//! │  │  (snapshot)   │   │  CreditCard   │   │  late interest │         │
//! │  │  quantity     │   │  Pix Fiado    │   │                │         │
//! │  └───────────────┘   └───────────────┘   └────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities are plain value structs with explicit foreign-key id fields.
//! A `Sale` owns its `SaleItem` values outright; nothing here holds live
//! references into a shared object graph.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// `Fiado` is deferred payment: store credit extended against the
/// customer ledger, bounded by the customer's credit limit.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Debit card.
    Debit,
    /// Credit card.
    CreditCard,
    /// Instant bank transfer.
    Pix,
    /// Deferred payment against the customer's store-credit ledger.
    Fiado,
}

impl PaymentMethod {
    /// All payment methods, in reporting order.
    ///
    /// Dashboard summaries zero-fill one entry per variant from this
    /// list; keep it in sync with the enum.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Debit,
        PaymentMethod::CreditCard,
        PaymentMethod::Pix,
        PaymentMethod::Fiado,
    ];

    /// Stable snake_case name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Fiado => "fiado",
        }
    }

    /// Parses a filter string, case-insensitively.
    ///
    /// Returns `None` for unknown values: an unrecognized payment-method
    /// filter is ignored rather than treated as an error.
    pub fn parse(value: &str) -> Option<PaymentMethod> {
        match value.to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "debit" => Some(PaymentMethod::Debit),
            "credit_card" => Some(PaymentMethod::CreditCard),
            "pix" => Some(PaymentMethod::Pix),
            "fiado" => Some(PaymentMethod::Fiado),
            _ => None,
        }
    }

    /// True for deferred (store-credit) payment.
    #[inline]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, PaymentMethod::Fiado)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item referenced (never owned) by the sale engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also snapshotted onto sale lines.
    pub name: String,

    /// Current sale price. `None` (or non-positive) blocks sales.
    pub sale_price: Option<Money>,

    /// Current stock level. `None` or non-positive at first observation
    /// means stock is untracked and the engine leaves it alone.
    pub stock_quantity: Option<Decimal>,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the engine treats this product's stock as tracked.
    ///
    /// Decided once per sale, at the moment the product is first loaded:
    /// present and strictly positive. Untracked products sell in any
    /// quantity without inventory checks.
    pub fn tracks_stock(&self) -> bool {
        matches!(self.stock_quantity, Some(qty) if qty > Decimal::ZERO)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with an optional store-credit ("fiado") ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// Soft-delete flag; inactive customers cannot be sold to.
    pub is_active: bool,

    /// Whether the customer may buy on store credit at all.
    pub credit_enabled: bool,

    /// Credit ceiling for the debit balance. `None` means unlimited.
    pub credit_limit: Option<Money>,

    /// Running debit balance; starts at zero, grows with fiado sales,
    /// shrinks when fiado sales are reversed (never clamped).
    pub debit_balance: Money,

    /// Timestamp of the most recent fiado purchase.
    pub last_credit_purchase_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale: header plus its owned line items.
///
/// Immutable once registered. The only lifecycle operation after
/// registration is reversal, which deletes the sale (items cascade)
/// after undoing its inventory and ledger effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,

    /// Referenced customer, required only for fiado sales.
    pub customer_id: Option<String>,

    /// Customer name resolved at load time, for display and sorting.
    pub customer_name: Option<String>,

    pub payment_method: PaymentMethod,

    /// Derived total: always the sum of line subtotals, recomputed by
    /// the engine and never trusted from input.
    pub total_value: Money,

    /// Optional free-text note.
    pub note: Option<String>,

    /// Assigned at registration, immutable afterwards.
    pub created_at: DateTime<Utc>,

    /// Line items in input order.
    pub items: Vec<SaleItem>,
}

/// One product-and-quantity line within a sale.
///
/// Uses the snapshot pattern: name and unit price are frozen at sale
/// time so later catalog edits never rewrite historical sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Unit price at time of sale (frozen copy, not a live reference).
    pub unit_price: Money,

    /// Quantity sold; fractional quantities are allowed for goods sold
    /// by weight or length.
    pub quantity: Decimal,

    /// Zero-based position of the line within its sale.
    pub line_no: i64,
}

impl SaleItem {
    /// Derived subtotal: `quantity × captured unit price`, exact.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

// =============================================================================
// Sale Draft (engine input)
// =============================================================================

/// Input shape for registering a sale, already shaped by the (out of
/// scope) request layer. The engine still validates it before touching
/// the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub items: Vec<SaleLine>,
}

/// One requested (product, quantity) pair within a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: Decimal,
}

// =============================================================================
// Credit Policy
// =============================================================================

/// Global fiado policy, read from settings and handed to the engine as
/// an explicit constructor argument (never ambient global state).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditPolicy {
    /// Months a fiado balance may age before it is considered late.
    pub grace_period_months: Option<i64>,

    /// Interest rate applied to late balances (e.g. "0.02" for 2%).
    pub late_interest_rate: Option<Decimal>,
}
