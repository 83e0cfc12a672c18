//! # Repository Module
//!
//! Database repository implementations for Balcão POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.products().get_by_id("uuid")                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── update(&self, product)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module also exposes connection-scoped helpers (taking
//! `&mut SqliteConnection`) so the sale engine can reuse the same row
//! mapping inside its transactions.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product lookup and maintenance
//! - [`customer::CustomerRepository`] - Customer and fiado ledger access
//! - [`settings::SettingsRepository`] - Store-wide credit settings
//! - [`sale`] - Sale row persistence shared by the engine and query service

pub mod customer;
pub mod product;
pub mod sale;
pub mod settings;
