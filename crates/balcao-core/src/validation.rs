//! # Validation Module
//!
//! Input validation for sale drafts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: Request layer (out of scope)                              │
//! │  └── Shape/type validation, deserialization                         │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE                                               │
//! │  └── Business preconditions, before any transaction is opened       │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  └── NOT NULL, FK and CHECK constraints                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::SaleDraft;
use crate::MAX_NOTE_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a sale draft before the engine touches the database.
///
/// ## Rules
/// - At least one line item
/// - Every quantity strictly positive (zero and negative rejected)
/// - Note at most [`MAX_NOTE_LEN`] characters
///
/// Referential checks (product exists, customer active, stock, credit)
/// happen inside the engine's transaction, not here.
pub fn validate_draft(draft: &SaleDraft) -> ValidationResult<()> {
    if draft.items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }

    for line in &draft.items {
        if line.quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            });
        }
    }

    if let Some(note) = &draft.note {
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(ValidationError::NoteTooLong { max: MAX_NOTE_LEN });
        }
    }

    Ok(())
}
