//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Tracking                                       │
//! │                                                                         │
//! │  stock_quantity column (TEXT decimal, nullable)                        │
//! │                                                                         │
//! │  NULL        → untracked: the store never counts this item             │
//! │  '0' or less → effectively untracked for new sales                     │
//! │  positive    → tracked: sales decrement it, reversals restore it       │
//! │                                                                         │
//! │  Fractional values are valid (items sold by weight).                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use balcao_core::Product;
use rust_decimal::Decimal;

use crate::codec;
use crate::error::DbResult;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    ///
    /// Returns `None` if no product with the ID exists.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        load(conn.as_mut(), id).await
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, sale_price, stock_quantity, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.sale_price.map(|p| p.amount().to_string()))
        .bind(product.stock_quantity.map(|q| q.to_string()))
        .bind(product.is_active)
        .bind(codec::format_timestamp(product.created_at))
        .bind(codec::format_timestamp(product.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, sale_price = ?3, stock_quantity = ?4, is_active = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.sale_price.map(|p| p.amount().to_string()))
        .bind(product.stock_quantity.map(|q| q.to_string()))
        .bind(product.is_active)
        .bind(codec::format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Connection-scoped helpers (used inside engine transactions)
// =============================================================================

/// Loads a product by ID on an existing connection.
pub(crate) async fn load(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, sale_price, stock_quantity, is_active, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Writes a product's stock level on an existing connection.
pub(crate) async fn save_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    stock_quantity: Option<&Decimal>,
    updated_at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("UPDATE products SET stock_quantity = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(stock_quantity.map(|q| q.to_string()))
        .bind(codec::format_timestamp(updated_at))
        .execute(conn)
        .await?;

    Ok(())
}

/// Maps a products row to the domain type.
pub(crate) fn from_row(row: &SqliteRow) -> DbResult<Product> {
    let sale_price: Option<String> = row.try_get("sale_price")?;
    let stock_quantity: Option<String> = row.try_get("stock_quantity")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        sale_price: sale_price
            .map(|raw| codec::parse_money("sale_price", &raw))
            .transpose()?,
        stock_quantity: stock_quantity
            .map(|raw| codec::parse_decimal("stock_quantity", &raw))
            .transpose()?,
        is_active: row.try_get("is_active")?,
        created_at: codec::parse_timestamp("created_at", &created_at)?,
        updated_at: codec::parse_timestamp("updated_at", &updated_at)?,
    })
}
