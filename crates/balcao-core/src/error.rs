//! # Error Types
//!
//! Domain-specific error types for balcao-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  balcao-core errors (this file)                                     │
//! │  ├── CoreError        - Business failures the caller can act on     │
//! │  └── ValidationError  - Input rejected before any I/O               │
//! │                                                                     │
//! │  balcao-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError ← DbError (via Unexpected)       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual Display impls
//! 2. Context in messages (entity, id, amounts)
//! 3. Errors are enum variants, never bare strings at the API surface
//! 4. Every business failure aborts the surrounding transaction; the
//!    caller always sees either a fully applied sale or a typed error

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business errors surfaced by the sale engine and query service.
///
/// All variants except [`CoreError::Unexpected`] are client errors:
/// retrying the identical request will fail the identical way.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product, customer, or sale does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Referenced entity exists but is unusable for this operation:
    /// inactive product/customer, missing price, fiado sale without an
    /// eligible customer.
    #[error("{0}")]
    InvalidState(String),

    /// Requested quantity exceeds tracked stock.
    #[error(
        "insufficient stock for product {product}: in stock {available}, requested {requested}"
    )]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A fiado sale would push the customer's debit balance past the
    /// configured credit limit.
    #[error(
        "credit limit exceeded for customer {customer}: limit {limit}, balance after sale {attempted_balance}"
    )]
    CreditLimitExceeded {
        customer: String,
        limit: Decimal,
        attempted_balance: Decimal,
    },

    /// Input rejected before any persistence work started.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence or other infrastructure failure; the message is a
    /// correlation string, not internal detail for the caller to parse.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidState(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures, raised before the engine opens its
/// transaction.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A sale must carry at least one line item.
    #[error("a sale requires at least one item")]
    EmptyItems,

    /// Quantities must be strictly positive.
    #[error("quantity for product {product_id} must be positive, got {quantity}")]
    NonPositiveQuantity {
        product_id: String,
        quantity: Decimal,
    },

    /// The free-text note exceeds the column width.
    #[error("note must be at most {max} characters")]
    NoteTooLong { max: usize },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
