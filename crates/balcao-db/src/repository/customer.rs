//! # Customer Repository
//!
//! Database operations for customers and their fiado ledger.
//!
//! ## The Fiado Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-Customer Ledger Columns                          │
//! │                                                                         │
//! │  credit_enabled          ← may this customer buy on store credit?      │
//! │  credit_limit (nullable) ← NULL means unlimited                        │
//! │  debit_balance           ← what the customer currently owes            │
//! │  last_credit_purchase_at ← set on every fiado sale                     │
//! │                                                                         │
//! │  The sale engine is the only writer of the last two columns.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use balcao_core::{Customer, Money};

use crate::codec;
use crate::error::DbResult;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    ///
    /// Returns `None` if no customer with the ID exists.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        load(conn.as_mut(), id).await
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers
                (id, name, is_active, credit_enabled, credit_limit, debit_balance,
                 last_credit_purchase_at, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.is_active)
        .bind(customer.credit_enabled)
        .bind(customer.credit_limit.map(|l| l.amount().to_string()))
        .bind(customer.debit_balance.amount().to_string())
        .bind(
            customer
                .last_credit_purchase_at
                .map(codec::format_timestamp),
        )
        .bind(codec::format_timestamp(customer.created_at))
        .bind(codec::format_timestamp(customer.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing customer's profile fields.
    ///
    /// Ledger columns are owned by the sale engine and not touched here.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        sqlx::query(
            r#"
            UPDATE customers
            SET name = ?2, is_active = ?3, credit_enabled = ?4, credit_limit = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.is_active)
        .bind(customer.credit_enabled)
        .bind(customer.credit_limit.map(|l| l.amount().to_string()))
        .bind(codec::format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Connection-scoped helpers (used inside engine transactions)
// =============================================================================

/// Loads a customer by ID on an existing connection.
pub(crate) async fn load(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, is_active, credit_enabled, credit_limit, debit_balance,
               last_credit_purchase_at, created_at, updated_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Writes a customer's ledger columns on an existing connection.
pub(crate) async fn save_ledger(
    conn: &mut SqliteConnection,
    customer_id: &str,
    debit_balance: Money,
    last_credit_purchase_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE customers
        SET debit_balance = ?2, last_credit_purchase_at = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(debit_balance.amount().to_string())
    .bind(last_credit_purchase_at.map(codec::format_timestamp))
    .bind(codec::format_timestamp(updated_at))
    .execute(conn)
    .await?;

    Ok(())
}

/// Maps a customers row to the domain type.
pub(crate) fn from_row(row: &SqliteRow) -> DbResult<Customer> {
    let credit_limit: Option<String> = row.try_get("credit_limit")?;
    let debit_balance: String = row.try_get("debit_balance")?;
    let last_credit_purchase_at: Option<String> = row.try_get("last_credit_purchase_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Customer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        credit_enabled: row.try_get("credit_enabled")?,
        credit_limit: credit_limit
            .map(|raw| codec::parse_money("credit_limit", &raw))
            .transpose()?,
        debit_balance: codec::parse_money("debit_balance", &debit_balance)?,
        last_credit_purchase_at: last_credit_purchase_at
            .map(|raw| codec::parse_timestamp("last_credit_purchase_at", &raw))
            .transpose()?,
        created_at: codec::parse_timestamp("created_at", &created_at)?,
        updated_at: codec::parse_timestamp("updated_at", &updated_at)?,
    })
}
