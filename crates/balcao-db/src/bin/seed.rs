//! # Demo Data Seeder
//!
//! Populates a development database with a small grocery catalog, a few
//! customers, and a handful of registered sales, then prints the
//! dashboard rollup as a smoke check.
//!
//! ## Usage
//! ```bash
//! cargo run -p balcao-db --bin seed
//! cargo run -p balcao-db --bin seed -- --db ./data/balcao.db
//! ```

use std::env;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use balcao_core::{CreditPolicy, Customer, PaymentMethod, Product, SaleDraft, SaleLine};
use balcao_db::{Database, DbConfig};

/// (name, price, stock). `None` stock means the store does not count it.
const CATALOG: &[(&str, &str, Option<&str>)] = &[
    ("Arroz Branco 5kg", "28.90", Some("40")),
    ("Feijão Carioca 1kg", "8.50", Some("60")),
    ("Café Torrado 500g", "25.50", Some("10")),
    ("Açúcar Cristal 2kg", "9.90", Some("35")),
    ("Óleo de Soja 900ml", "7.80", Some("48")),
    ("Farinha de Trigo 1kg", "6.20", Some("25")),
    ("Leite Integral 1L", "5.90", Some("72")),
    ("Queijo Minas (kg)", "42.00", Some("6.5")),
    ("Presunto (kg)", "36.00", Some("4.2")),
    ("Pão Francês (kg)", "16.00", None),
    ("Refrigerante 2L", "9.50", Some("30")),
    ("Sabão em Pó 1kg", "14.30", Some("18")),
];

/// (name, credit_enabled, credit_limit)
const CUSTOMERS: &[(&str, bool, Option<&str>)] = &[
    ("Maria das Graças", true, Some("200.00")),
    ("João Batista", true, Some("150.00")),
    ("Dona Ana", true, None),
    ("Seu Carlos", false, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./balcao_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Balcão POS Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./balcao_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Balcão POS Demo Data Seeder");
    println!("===========================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db
        .queries()
        .list(&Default::default(), None, 0, 1)
        .await?
        .total_elements;
    if existing > 0 {
        println!("⚠ Database already has {existing} sales, skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    let mut product_ids = Vec::new();
    for &(name, price, stock) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            sale_price: Some(price.parse::<Decimal>()?.into()),
            stock_quantity: stock.map(str::parse).transpose()?,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        product_ids.push(product.id);
    }
    println!("✓ Seeded {} products", product_ids.len());

    let mut customer_ids = Vec::new();
    for &(name, credit_enabled, limit) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: true,
            credit_enabled,
            credit_limit: limit.map(|l| l.parse::<Decimal>().map(Into::into)).transpose()?,
            debit_balance: Decimal::ZERO.into(),
            last_credit_purchase_at: None,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Seeded {} customers", customer_ids.len());

    let policy = CreditPolicy {
        grace_period_months: Some(1),
        late_interest_rate: Some("0.02".parse()?),
    };
    db.settings().save_credit_policy(&policy).await?;
    println!("✓ Saved credit policy");

    let engine = db.engine(policy);
    let carts: &[(Option<usize>, PaymentMethod, &[(usize, &str)])] = &[
        (None, PaymentMethod::Cash, &[(0, "1"), (1, "2"), (6, "3")]),
        (None, PaymentMethod::Pix, &[(10, "2"), (4, "1")]),
        (Some(0), PaymentMethod::Fiado, &[(2, "1"), (3, "1")]),
        (Some(2), PaymentMethod::Fiado, &[(7, "0.450"), (9, "0.600")]),
        (None, PaymentMethod::Debit, &[(11, "1"), (5, "2")]),
    ];

    for &(customer_idx, payment_method, lines) in carts {
        let draft = SaleDraft {
            customer_id: customer_idx.map(|idx| customer_ids[idx].clone()),
            payment_method,
            note: None,
            items: lines
                .iter()
                .map(|(product_idx, quantity)| {
                    Ok(SaleLine {
                        product_id: product_ids[*product_idx].clone(),
                        quantity: quantity.parse()?,
                    })
                })
                .collect::<Result<_, rust_decimal::Error>>()?,
        };
        let sale = engine.register(draft).await?;
        println!(
            "  Registered sale {} ({}, R$ {})",
            sale.id,
            sale.payment_method.as_str(),
            sale.total_value
        );
    }

    println!();
    let dashboard = db.queries().dashboard_summary(None, None).await?;
    println!("Dashboard:");
    println!("  Gross total:    R$ {}", dashboard.gross_total);
    println!("  Sales:          {}", dashboard.sale_count);
    println!("  Average ticket: R$ {}", dashboard.average_ticket);
    if let Some(best) = &dashboard.best_seller {
        println!(
            "  Best seller:    {} ({} un, R$ {})",
            best.product_name, best.total_quantity, best.total_value
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
