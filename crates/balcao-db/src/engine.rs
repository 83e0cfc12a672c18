//! # Sale Engine
//!
//! The transactional core: sale registration and sale reversal.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    register(draft)                                      │
//! │                                                                         │
//! │  validate draft (no I/O)                                               │
//! │       │                                                                 │
//! │       ▼  BEGIN ──────────────────────────────────────────────┐         │
//! │  load customer, check active                                 │         │
//! │  fiado? check customer present + credit_enabled              │         │
//! │  per line:                                                   │         │
//! │    load product (once per distinct product, then cached)     │         │
//! │    snapshot name + price into the item                       │         │
//! │    tracked stock? check availability, decrement in memory    │         │
//! │  insert sale + items                                         │         │
//! │  write decremented stock levels (one pass, first-touch order)│         │
//! │  fiado? balance += total, check credit limit, write ledger   │         │
//! │       │                                                      │         │
//! │       ▼  COMMIT ─────────────────────────────────────────────┘         │
//! │  Ok(sale)                                                              │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction → full rollback.        │
//! │  The credit-limit check deliberately runs after the sale and stock     │
//! │  writes; rejection rolls every write back at once.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reversal
//! `reverse(sale_id)` is the exact inverse: restore stock for every item
//! whose product currently tracks stock, subtract the total from the
//! fiado ledger (if the sale was fiado), then delete the sale rows.
//! Same transaction discipline.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use balcao_core::{
    validation, CoreError, CoreResult, CreditPolicy, Customer, Money, Product, Sale, SaleDraft,
    SaleItem,
};

use crate::error::DbError;
use crate::repository::{customer, product, sale};

/// A product loaded once for the duration of a sale.
///
/// `tracked` is decided at first load and never revisited: a product
/// whose stock reaches exactly zero mid-sale keeps participating in
/// availability checks for its remaining lines.
struct CachedProduct {
    product: Product,
    tracked: bool,
    touched: bool,
}

/// The sale transaction engine.
///
/// Owns every state transition of a sale. All reads and writes of one
/// call happen inside a single database transaction; callers observe
/// either the complete effect or none of it.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
    policy: CreditPolicy,
}

impl SaleEngine {
    /// Creates a sale engine bound to a pool and a credit policy.
    pub fn new(pool: SqlitePool, policy: CreditPolicy) -> Self {
        SaleEngine { pool, policy }
    }

    /// Returns the credit policy this engine was constructed with.
    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// Registers a sale.
    ///
    /// ## Errors
    /// * `Validation` - empty items, non-positive quantity, oversized note
    /// * `NotFound` - unknown customer or product ID
    /// * `InvalidState` - inactive customer/product, missing price,
    ///   fiado without an eligible customer
    /// * `InsufficientStock` - a tracked product cannot cover a line
    /// * `CreditLimitExceeded` - the fiado balance would pass the limit
    ///
    /// On any error the database is left exactly as it was.
    pub async fn register(&self, draft: SaleDraft) -> CoreResult<Sale> {
        validation::validate_draft(&draft)?;

        debug!(
            payment_method = draft.payment_method.as_str(),
            lines = draft.items.len(),
            "Registering sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Customer resolution and eligibility happen before any write.
        let mut sale_customer = match &draft.customer_id {
            Some(id) => Some(self.load_eligible_customer(&mut tx, id).await?),
            None => None,
        };

        if draft.payment_method.is_deferred() {
            let customer = sale_customer.as_ref().ok_or_else(|| {
                CoreError::invalid_state("a fiado sale requires an identified customer")
            })?;
            if !customer.credit_enabled {
                return Err(CoreError::invalid_state(format!(
                    "customer {} is not enabled for fiado purchases",
                    customer.name
                )));
            }
        }

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        let mut cache: HashMap<String, CachedProduct> = HashMap::new();
        let mut touch_order: Vec<String> = Vec::new();
        let mut items: Vec<SaleItem> = Vec::with_capacity(draft.items.len());
        let mut total = Money::zero();

        for (line_no, line) in draft.items.iter().enumerate() {
            if !cache.contains_key(&line.product_id) {
                let product = self.load_saleable_product(&mut tx, &line.product_id).await?;
                let tracked = product.tracks_stock();
                cache.insert(
                    line.product_id.clone(),
                    CachedProduct {
                        product,
                        tracked,
                        touched: false,
                    },
                );
            }
            // Just inserted if absent, lookup cannot fail.
            let cached = cache
                .get_mut(&line.product_id)
                .ok_or_else(|| CoreError::Unexpected("product cache miss".into()))?;

            let unit_price = cached
                .product
                .sale_price
                .filter(Money::is_positive)
                .ok_or_else(|| {
                    CoreError::invalid_state(format!(
                        "product {} has no valid sale price",
                        cached.product.name
                    ))
                })?;

            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                product_name: cached.product.name.clone(),
                unit_price,
                quantity: line.quantity,
                line_no: line_no as i64,
            });
            total += unit_price.times(line.quantity);

            if cached.tracked {
                let available = cached.product.stock_quantity.unwrap_or_default();
                if available < line.quantity {
                    return Err(CoreError::InsufficientStock {
                        product: cached.product.name.clone(),
                        available,
                        requested: line.quantity,
                    });
                }
                // Cumulative: a product repeated across lines sees the
                // running figure, never a fresh read.
                cached.product.stock_quantity = Some(available - line.quantity);
                if !cached.touched {
                    cached.touched = true;
                    touch_order.push(line.product_id.clone());
                }
            } else {
                debug!(
                    product_id = %line.product_id,
                    "Stock untracked or depleted, skipping inventory bookkeeping"
                );
            }
        }

        let new_sale = Sale {
            id: sale_id.clone(),
            customer_id: draft.customer_id.clone(),
            customer_name: sale_customer.as_ref().map(|c| c.name.clone()),
            payment_method: draft.payment_method,
            total_value: total,
            note: draft.note.clone(),
            created_at: now,
            items,
        };

        sale::insert(&mut tx, &new_sale).await?;

        for product_id in &touch_order {
            if let Some(cached) = cache.get(product_id) {
                product::save_stock(
                    &mut tx,
                    product_id,
                    cached.product.stock_quantity.as_ref(),
                    now,
                )
                .await?;
            }
        }

        if new_sale.payment_method.is_deferred() {
            if let Some(customer) = sale_customer.as_mut() {
                let new_balance = customer.debit_balance + new_sale.total_value;

                debug!(
                    customer_id = %customer.id,
                    balance = %new_balance,
                    grace_period_months = ?self.policy.grace_period_months,
                    "Applying fiado purchase to ledger"
                );

                if let Some(limit) = customer.credit_limit {
                    if new_balance > limit {
                        return Err(CoreError::CreditLimitExceeded {
                            customer: customer.name.clone(),
                            limit: limit.amount(),
                            attempted_balance: new_balance.amount(),
                        });
                    }
                }

                customer.debit_balance = new_balance;
                customer.last_credit_purchase_at = Some(now);
                customer::save_ledger(
                    &mut tx,
                    &customer.id,
                    customer.debit_balance,
                    customer.last_credit_purchase_at,
                    now,
                )
                .await?;
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %new_sale.id,
            total = %new_sale.total_value,
            payment_method = new_sale.payment_method.as_str(),
            "Sale registered"
        );

        Ok(new_sale)
    }

    /// Reverses a previously registered sale.
    ///
    /// Restores stock for every item whose product currently tracks
    /// stock, unwinds the fiado ledger if the sale was deferred, then
    /// deletes the sale and its items. All in one transaction.
    ///
    /// ## Errors
    /// * `NotFound` - unknown sale ID
    ///
    /// A customer deleted since the sale does not block reversal: the
    /// ledger step is skipped with a warning.
    pub async fn reverse(&self, sale_id: &str) -> CoreResult<()> {
        debug!(sale_id, "Reversing sale");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let reversed = sale::fetch_with_items(&mut tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        let now = Utc::now();

        // Accumulate restocks in memory, then write once per product.
        let mut restock: HashMap<String, Option<Decimal>> = HashMap::new();
        let mut restock_order: Vec<String> = Vec::new();

        for item in &reversed.items {
            match restock.get_mut(&item.product_id) {
                Some(Some(level)) => *level += item.quantity,
                Some(None) => {} // already known untracked
                None => {
                    let current = product::load(&mut tx, &item.product_id)
                        .await?
                        .ok_or_else(|| {
                            CoreError::not_found("Product", item.product_id.clone())
                        })?;
                    match current.stock_quantity {
                        Some(level) => {
                            restock.insert(item.product_id.clone(), Some(level + item.quantity));
                            restock_order.push(item.product_id.clone());
                        }
                        None => {
                            debug!(
                                product_id = %item.product_id,
                                "Stock untracked, nothing to restore"
                            );
                            restock.insert(item.product_id.clone(), None);
                        }
                    }
                }
            }
        }

        for product_id in &restock_order {
            if let Some(Some(level)) = restock.get(product_id) {
                product::save_stock(&mut tx, product_id, Some(level), now).await?;
            }
        }

        if reversed.payment_method.is_deferred() {
            if let Some(customer_id) = &reversed.customer_id {
                match customer::load(&mut tx, customer_id).await? {
                    Some(customer) => {
                        // Unclamped subtraction: payments recorded since
                        // the sale may legitimately drive this negative.
                        let new_balance = customer.debit_balance - reversed.total_value;
                        customer::save_ledger(
                            &mut tx,
                            &customer.id,
                            new_balance,
                            customer.last_credit_purchase_at,
                            now,
                        )
                        .await?;
                        debug!(
                            customer_id = %customer.id,
                            balance = %new_balance,
                            "Fiado ledger unwound"
                        );
                    }
                    None => {
                        warn!(
                            sale_id,
                            customer_id = %customer_id,
                            "Customer missing, skipping ledger reversal"
                        );
                    }
                }
            }
        }

        sale::delete(&mut tx, sale_id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id,
            total = %reversed.total_value,
            "Sale reversed"
        );

        Ok(())
    }

    /// Loads a customer and verifies it can take part in a sale.
    async fn load_eligible_customer(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: &str,
    ) -> CoreResult<Customer> {
        let loaded = customer::load(tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", id.to_string()))?;

        if !loaded.is_active {
            return Err(CoreError::invalid_state(format!(
                "customer {} is inactive",
                loaded.name
            )));
        }

        Ok(loaded)
    }

    /// Loads a product and verifies it can be sold.
    async fn load_saleable_product(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: &str,
    ) -> CoreResult<Product> {
        let loaded = product::load(tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id.to_string()))?;

        if !loaded.is_active {
            return Err(CoreError::invalid_state(format!(
                "product {} is inactive",
                loaded.name
            )));
        }

        Ok(loaded)
    }
}
