//! # balcao-core: Pure Business Logic for Balcão POS
//!
//! This crate is the heart of the Balcão back end. It contains the domain
//! model and business rules as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Balcão POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │             ★ balcao-core (THIS CRATE) ★                      │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐  ┌─────────┐  ┌───────────┐  ┌────────────┐    │ │
//! │  │   │  types  │  │  money  │  │   error   │  │ validation │    │ │
//! │  │   │ Product │  │  Money  │  │ CoreError │  │ SaleDraft  │    │ │
//! │  │   │  Sale   │  │ Decimal │  │  taxonomy │  │   checks   │    │ │
//! │  │   └─────────┘  └─────────┘  └───────────┘  └────────────┘    │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                 balcao-db (Database Layer)                    │ │
//! │  │      SQLite repositories, sale engine, query service          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Exact Decimals**: every monetary value and quantity is a
//!    [`rust_decimal::Decimal`] (wrapped in [`money::Money`] for amounts).
//!    Floats never touch business math.
//! 2. **Plain Value Structs**: entities reference each other by id fields,
//!    never through shared object graphs; related data is loaded explicitly.
//! 3. **Explicit Errors**: all failures are typed enum variants, never
//!    strings or panics.

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum length of the free-text note on a sale.
///
/// Matches the column width of `sales.note`; enforced up front so a long
/// note fails validation instead of a database constraint.
pub const MAX_NOTE_LEN: usize = 500;
