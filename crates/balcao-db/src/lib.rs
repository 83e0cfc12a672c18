//! # balcao-db: Database Layer for Balcão POS
//!
//! This crate provides database access for the Balcão POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Balcão POS Data Flow                             │
//! │                                                                         │
//! │  Caller (register a sale / query the dashboard)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     balcao-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  SaleEngine   │    │ QueryService │  │   │
//! │  │   │   (pool.rs)   │    │  (engine.rs)  │    │  (query.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ register()    │    │ list()       │  │   │
//! │  │   │ Migrations    │    │ reverse()     │    │ summary()    │  │   │
//! │  │   │ Repositories  │    │ (one tx each) │    │ dashboard()  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, customer, ...)
//! - [`engine`] - The transactional sale engine (register / reverse)
//! - [`query`] - Read-only sale listing and reporting
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balcao_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/balcao.db")).await?;
//!
//! let policy = db.settings().credit_policy().await?;
//! let sale = db.engine(policy).register(draft).await?;
//!
//! let dashboard = db.queries().dashboard_summary(None, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod codec;

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SaleEngine;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use query::{
    BestSeller, DailyTotal, DashboardSummary, GroupSummary, PageResponse, PaymentMethodTotal,
    SaleFilter, SaleQueryService,
};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
