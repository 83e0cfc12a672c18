//! Integration tests for the sale engine: registration, stock
//! decrement, fiado ledger, and reversal, all against in-memory SQLite.

mod common;

use balcao_core::{CoreError, CreditPolicy, PaymentMethod};
use common::*;

#[tokio::test]
async fn register_cash_sale_totals_and_decrements_stock() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Coffee 500g", Some("25.50"), Some("10")).await;

    let sale = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "2")]))
        .await
        .unwrap();

    assert_eq!(sale.total_value, money("51.00"));
    assert_eq!(sale.payment_method, PaymentMethod::Cash);
    assert_eq!(sale.items.len(), 1);
    assert_eq!(sale.items[0].product_name, "Coffee 500g");
    assert_eq!(sale.items[0].unit_price, money("25.50"));
    assert_eq!(sale.items[0].quantity, dec("2"));

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("8")));

    // And it is durably queryable.
    let fetched = db.queries().find_by_id(&sale.id).await.unwrap();
    assert_eq!(fetched.total_value, money("51.00"));
    assert_eq!(fetched.items.len(), 1);
}

#[tokio::test]
async fn register_snapshots_survive_product_edits() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let mut product = seed_product(&db, "Original Name", Some("10.00"), None).await;
    let sale = engine
        .register(draft(None, PaymentMethod::Pix, &[(&product.id, "1")]))
        .await
        .unwrap();

    product.name = "Renamed".to_string();
    product.sale_price = Some(money("99.00"));
    db.products().update(&product).await.unwrap();

    let fetched = db.queries().find_by_id(&sale.id).await.unwrap();
    assert_eq!(fetched.items[0].product_name, "Original Name");
    assert_eq!(fetched.items[0].unit_price, money("10.00"));
}

#[tokio::test]
async fn register_untracked_stock_allows_any_quantity() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let untracked = seed_product(&db, "Bulk Rice", Some("4.00"), None).await;
    let depleted = seed_product(&db, "Old Batch", Some("2.00"), Some("0")).await;

    engine
        .register(draft(
            None,
            PaymentMethod::Cash,
            &[(&untracked.id, "1000"), (&depleted.id, "50")],
        ))
        .await
        .unwrap();

    let untracked = db.products().get_by_id(&untracked.id).await.unwrap().unwrap();
    assert_eq!(untracked.stock_quantity, None);
    let depleted = db.products().get_by_id(&depleted.id).await.unwrap().unwrap();
    assert_eq!(depleted.stock_quantity, Some(dec("0")));
}

#[tokio::test]
async fn register_rejects_insufficient_stock() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Scarce", Some("5.00"), Some("1")).await;

    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "2")]))
        .await
        .unwrap_err();

    match err {
        CoreError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, dec("1"));
            assert_eq!(requested, dec("2"));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Nothing persisted.
    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("1")));
}

#[tokio::test]
async fn register_repeated_product_decrements_cumulatively() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Soda", Some("3.00"), Some("5")).await;

    engine
        .register(draft(
            None,
            PaymentMethod::Debit,
            &[(&product.id, "2"), (&product.id, "2")],
        ))
        .await
        .unwrap();

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("1")));

    // A third unit across two lines must see the running figure, not a
    // fresh read: 3 in stock, lines of 2 + 2 fail on the second line.
    let scarce = seed_product(&db, "Scarce Soda", Some("3.00"), Some("3")).await;
    let err = engine
        .register(draft(
            None,
            PaymentMethod::Debit,
            &[(&scarce.id, "2"), (&scarce.id, "2")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientStock { .. }));

    let stored = db.products().get_by_id(&scarce.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("3")));
}

#[tokio::test]
async fn register_fiado_updates_ledger() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let customer = seed_customer(&db, "Maria", true, Some("200.00"), "10.00").await;
    let product = seed_product(&db, "Beans", Some("15.00"), None).await;

    let sale = engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "2")],
        ))
        .await
        .unwrap();

    assert_eq!(sale.customer_name.as_deref(), Some("Maria"));

    let stored = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(stored.debit_balance, money("40.00"));
    assert_eq!(stored.last_credit_purchase_at, Some(sale.created_at));
}

#[tokio::test]
async fn register_fiado_over_limit_rolls_back_everything() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let customer = seed_customer(&db, "João", true, Some("100.00"), "10.00").await;
    let product = seed_product(&db, "Cheese", Some("51.00"), Some("10")).await;

    // 2 × 51.00 = 102.00; 10.00 + 102.00 > 100.00.
    let err = engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "2")],
        ))
        .await
        .unwrap_err();

    match err {
        CoreError::CreditLimitExceeded {
            limit,
            attempted_balance,
            ..
        } => {
            assert_eq!(limit, dec("100.00"));
            assert_eq!(attempted_balance, dec("112.00"));
        }
        other => panic!("expected CreditLimitExceeded, got {other:?}"),
    }

    // The limit check runs after the sale and stock writes; rejection
    // must undo all of them.
    let stored = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(stored.debit_balance, money("10.00"));
    assert_eq!(stored.last_credit_purchase_at, None);

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("10")));

    let page = db
        .queries()
        .list(&Default::default(), None, 0, 10)
        .await
        .unwrap();
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn register_fiado_without_limit_is_unbounded() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let customer = seed_customer(&db, "Ana", true, None, "5000.00").await;
    let product = seed_product(&db, "Freezer", Some("3000.00"), None).await;

    engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "1")],
        ))
        .await
        .unwrap();

    let stored = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(stored.debit_balance, money("8000.00"));
}

#[tokio::test]
async fn register_fiado_requires_eligible_customer() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Milk", Some("6.00"), None).await;

    // No customer at all.
    let err = engine
        .register(draft(None, PaymentMethod::Fiado, &[(&product.id, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // Customer without credit enabled.
    let customer = seed_customer(&db, "Pedro", false, None, "0").await;
    let err = engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "1")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn register_rejects_bad_references_and_input() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Bread", Some("1.00"), None).await;

    // Unknown product.
    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[("missing-id", "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    // Unknown customer.
    let err = engine
        .register(draft(
            Some("missing-id"),
            PaymentMethod::Cash,
            &[(&product.id, "1")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    // Empty item list fails before any I/O.
    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // Zero quantity.
    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "0")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn register_rejects_unpriced_and_inactive_products() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let unpriced = seed_product(&db, "No Price", None, None).await;
    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[(&unpriced.id, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    let mut retired = seed_product(&db, "Retired", Some("9.00"), None).await;
    retired.is_active = false;
    db.products().update(&retired).await.unwrap();

    let err = engine
        .register(draft(None, PaymentMethod::Cash, &[(&retired.id, "1")]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn register_accepts_fractional_quantities() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Ham (kg)", Some("30.00"), Some("2.5")).await;

    let sale = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "0.35")]))
        .await
        .unwrap();

    assert_eq!(sale.total_value, money("10.5000"));

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("2.15")));
}

#[tokio::test]
async fn reverse_restores_stock_and_deletes_sale() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Coffee 500g", Some("25.50"), Some("10")).await;
    let sale = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "2")]))
        .await
        .unwrap();

    engine.reverse(&sale.id).await.unwrap();

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("10")));

    let err = db.queries().find_by_id(&sale.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    // Items are gone with the sale.
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE sale_id = ?1")
        .bind(&sale.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn reverse_merges_restock_with_interleaved_sales() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Sugar 1kg", Some("6.00"), Some("10")).await;
    let first = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "2")]))
        .await
        .unwrap();

    // A later sale moves the stock before the first one is undone.
    engine
        .register(draft(None, PaymentMethod::Pix, &[(&product.id, "3")]))
        .await
        .unwrap();

    engine.reverse(&first.id).await.unwrap();

    // Restock applies on top of the current figure, not the original one.
    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("7")));
}

#[tokio::test]
async fn reverse_unwinds_fiado_balance_without_clamping() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let customer = seed_customer(&db, "Maria", true, None, "0").await;
    let product = seed_product(&db, "Beans", Some("15.00"), None).await;

    let sale = engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "2")],
        ))
        .await
        .unwrap();

    // A payment recorded after the sale dropped the balance below the
    // sale total; reversal still subtracts the full amount.
    sqlx::query("UPDATE customers SET debit_balance = '10.00' WHERE id = ?1")
        .bind(&customer.id)
        .execute(db.pool())
        .await
        .unwrap();

    engine.reverse(&sale.id).await.unwrap();

    let stored = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
    assert_eq!(stored.debit_balance, money("-20.00"));
}

#[tokio::test]
async fn reverse_skips_ledger_when_customer_is_gone() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let customer = seed_customer(&db, "Ghost", true, None, "0").await;
    let product = seed_product(&db, "Beans", Some("15.00"), Some("10")).await;

    let sale = engine
        .register(draft(
            Some(&customer.id),
            PaymentMethod::Fiado,
            &[(&product.id, "1")],
        ))
        .await
        .unwrap();

    // Simulate a hand-edited database where the customer row vanished
    // while the sale still references it.
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM customers WHERE id = ?1")
        .bind(&customer.id)
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(db.pool())
        .await
        .unwrap();

    // Reversal completes: stock restored, sale deleted, ledger skipped.
    engine.reverse(&sale.id).await.unwrap();

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, Some(dec("10")));

    let err = db.queries().find_by_id(&sale.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn reverse_leaves_untracked_products_alone() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let product = seed_product(&db, "Bulk Rice", Some("4.00"), None).await;
    let sale = engine
        .register(draft(None, PaymentMethod::Cash, &[(&product.id, "3")]))
        .await
        .unwrap();

    engine.reverse(&sale.id).await.unwrap();

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, None);
}

#[tokio::test]
async fn reverse_unknown_sale_is_not_found() {
    let db = test_db().await;
    let engine = db.engine(CreditPolicy::default());

    let err = engine.reverse("no-such-sale").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}
