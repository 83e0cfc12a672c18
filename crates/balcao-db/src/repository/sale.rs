//! # Sale Row Persistence
//!
//! Row-level reads and writes for sales and their items, shared by the
//! sale engine (inside transactions) and the query service (pool reads).
//!
//! ## Snapshot Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale_items carries product_name and unit_price copied at sale time.   │
//! │  Later edits to the product never rewrite history: a receipt printed   │
//! │  in January still shows January's price in July.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions here take `&mut SqliteConnection` so callers decide the
//! transaction boundary.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use balcao_core::{PaymentMethod, Sale, SaleItem};

use crate::codec;
use crate::error::DbResult;

/// Inserts a sale header and all of its items.
pub(crate) async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(sale_id = %sale.id, items = sale.items.len(), "Inserting sale rows");

    sqlx::query(
        r#"
        INSERT INTO sales (id, customer_id, payment_method, total_value, note, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(sale.payment_method)
    .bind(sale.total_value.amount().to_string())
    .bind(&sale.note)
    .bind(codec::format_timestamp(sale.created_at))
    .execute(&mut *conn)
    .await?;

    for item in &sale.items {
        sqlx::query(
            r#"
            INSERT INTO sale_items
                (id, sale_id, product_id, product_name, unit_price, quantity, line_no)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price.amount().to_string())
        .bind(item.quantity.to_string())
        .bind(item.line_no)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Fetches a sale with its items, or `None` if the ID is unknown.
///
/// The customer name is resolved via LEFT JOIN so anonymous sales come
/// back with `customer_name = None`.
pub(crate) async fn fetch_with_items(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Option<Sale>> {
    let row = sqlx::query(
        r#"
        SELECT s.id, s.customer_id, c.name AS customer_name, s.payment_method,
               s.total_value, s.note, s.created_at
        FROM sales s
        LEFT JOIN customers c ON c.id = s.customer_id
        WHERE s.id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut sale = sale_from_row(&row)?;
    sale.items = fetch_items(conn, sale_id).await?;
    Ok(Some(sale))
}

/// Fetches the items of one sale in line order.
pub(crate) async fn fetch_items(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<SaleItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, sale_id, product_id, product_name, unit_price, quantity, line_no
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    rows.iter().map(item_from_row).collect()
}

/// Deletes a sale header; `ON DELETE CASCADE` removes its items.
pub(crate) async fn delete(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM sales WHERE id = ?1")
        .bind(sale_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Maps a sales row (joined with the customer name) to the domain type.
///
/// Items are left empty; callers attach them separately.
pub(crate) fn sale_from_row(row: &SqliteRow) -> DbResult<Sale> {
    let total_value: String = row.try_get("total_value")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Sale {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        customer_name: row.try_get("customer_name")?,
        payment_method: row.try_get::<PaymentMethod, _>("payment_method")?,
        total_value: codec::parse_money("total_value", &total_value)?,
        note: row.try_get("note")?,
        created_at: codec::parse_timestamp("created_at", &created_at)?,
        items: Vec::new(),
    })
}

/// Maps a sale_items row to the domain type.
pub(crate) fn item_from_row(row: &SqliteRow) -> DbResult<SaleItem> {
    let unit_price: String = row.try_get("unit_price")?;
    let quantity: String = row.try_get("quantity")?;

    Ok(SaleItem {
        id: row.try_get("id")?,
        sale_id: row.try_get("sale_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        unit_price: codec::parse_money("unit_price", &unit_price)?,
        quantity: codec::parse_decimal("quantity", &quantity)?,
        line_no: row.try_get("line_no")?,
    })
}
