//! Shared fixtures for the integration tests: an in-memory database and
//! seed helpers for products, customers, and pre-dated sales.

// Each test binary compiles this module separately and uses a subset.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use balcao_core::{Customer, Money, PaymentMethod, Product, SaleDraft, SaleLine};
use balcao_db::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

pub fn money(s: &str) -> Money {
    Money::new(dec(s))
}

pub async fn seed_product(
    db: &Database,
    name: &str,
    price: Option<&str>,
    stock: Option<&str>,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        sale_price: price.map(money),
        stock_quantity: stock.map(dec),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.expect("seed product");
    product
}

pub async fn seed_customer(
    db: &Database,
    name: &str,
    credit_enabled: bool,
    credit_limit: Option<&str>,
    debit_balance: &str,
) -> Customer {
    let now = Utc::now();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        is_active: true,
        credit_enabled,
        credit_limit: credit_limit.map(money),
        debit_balance: money(debit_balance),
        last_credit_purchase_at: None,
        created_at: now,
        updated_at: now,
    };
    db.customers()
        .insert(&customer)
        .await
        .expect("seed customer");
    customer
}

pub fn draft(
    customer_id: Option<&str>,
    payment_method: PaymentMethod,
    lines: &[(&str, &str)],
) -> SaleDraft {
    SaleDraft {
        customer_id: customer_id.map(str::to_string),
        payment_method,
        note: None,
        items: lines
            .iter()
            .map(|(product_id, quantity)| SaleLine {
                product_id: product_id.to_string(),
                quantity: dec(quantity),
            })
            .collect(),
    }
}

/// Inserts a sale header directly, bypassing the engine, so tests can
/// control `created_at` for date-window and grouping assertions.
pub async fn insert_sale_at(
    db: &Database,
    customer_id: Option<&str>,
    payment_method: PaymentMethod,
    total: &str,
    created_at: DateTime<Utc>,
) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sales (id, customer_id, payment_method, total_value, note, created_at)
         VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
    )
    .bind(&id)
    .bind(customer_id)
    .bind(payment_method)
    .bind(total)
    .bind(created_at.to_rfc3339())
    .execute(db.pool())
    .await
    .expect("insert dated sale");
    id
}

/// Attaches an item row to a sale inserted with [`insert_sale_at`].
pub async fn insert_item(
    db: &Database,
    sale_id: &str,
    product_id: &str,
    product_name: &str,
    unit_price: &str,
    quantity: &str,
    line_no: i64,
) {
    sqlx::query(
        "INSERT INTO sale_items (id, sale_id, product_id, product_name, unit_price, quantity, line_no)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(sale_id)
    .bind(product_id)
    .bind(product_name)
    .bind(unit_price)
    .bind(quantity)
    .bind(line_no)
    .execute(db.pool())
    .await
    .expect("insert sale item");
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("timestamp literal")
        .with_timezone(&Utc)
}
