//! # Sale Query Service
//!
//! Read-only views over registered sales: filtered listing with
//! pagination, per-group revenue summaries, and the dashboard rollup.
//!
//! ## Aggregation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Money columns are TEXT decimals, so SQL SUM() would go through        │
//! │  floating point. Aggregates instead select the raw per-row values      │
//! │  and fold them with exact Decimal arithmetic in Rust. One query per    │
//! │  aggregate either way.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Date Windows
//! Every operation takes an optional `[start, end]` window (inclusive on
//! both sides). Missing bounds widen to sentinel values far outside any
//! real sale, so "no filter" and "full range" are the same query shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use balcao_core::{CoreError, CoreResult, Money, PaymentMethod, Sale};

use crate::codec;
use crate::error::DbError;
use crate::repository::sale;

/// Inclusive lower bound used when a filter has no start date.
const MIN_TS: &str = "1900-01-01T00:00:00+00:00";
/// Inclusive upper bound used when a filter has no end date.
const MAX_TS: &str = "9999-12-31T23:59:59+00:00";

// =============================================================================
// Filter and response types
// =============================================================================

/// Optional criteria for listing and aggregating sales.
///
/// All fields are conjunctive; a default filter matches every sale.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Inclusive start of the date window.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive end of the date window.
    pub end: Option<DateTime<Utc>>,
    /// Only sales registered to this customer.
    pub customer_id: Option<String>,
    /// Only sales paid with this method.
    pub payment_method: Option<PaymentMethod>,
    /// Only sales containing at least one line for this product.
    pub product_id: Option<String>,
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    /// Zero-based page number.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

/// Revenue attributed to one group (a day or a customer).
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    /// Stable identifier of the group (ISO date or customer ID).
    pub key: String,
    /// Human-readable label (the date again, or the customer name).
    pub label: String,
    pub total: Money,
}

/// Revenue taken through one payment method.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodTotal {
    pub payment_method: PaymentMethod,
    pub total: Money,
}

/// Revenue of one calendar day (UTC).
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    /// ISO date, `YYYY-MM-DD`.
    pub day: String,
    pub total: Money,
}

/// The product that moved the most units in a window.
#[derive(Debug, Clone, Serialize)]
pub struct BestSeller {
    pub product_id: String,
    pub product_name: String,
    pub total_quantity: Decimal,
    pub total_value: Money,
}

/// Everything the storefront dashboard shows for one date window.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub gross_total: Money,
    pub sale_count: i64,
    /// Gross total divided by sale count, half-up to cents.
    pub average_ticket: Money,
    /// One entry per payment method, zero-filled for methods unused in
    /// the window.
    pub totals_by_method: Vec<PaymentMethodTotal>,
    pub best_seller: Option<BestSeller>,
    /// Ascending by day; days without sales are absent.
    pub daily_totals: Vec<DailyTotal>,
}

// =============================================================================
// Service
// =============================================================================

/// Read-only query service over sales.
///
/// Never writes. Safe to hold alongside a [`crate::engine::SaleEngine`]
/// on the same pool.
#[derive(Debug, Clone)]
pub struct SaleQueryService {
    pool: SqlitePool,
}

impl SaleQueryService {
    /// Creates a new query service on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SaleQueryService { pool }
    }

    /// Fetches a single sale with its items.
    pub async fn find_by_id(&self, sale_id: &str) -> CoreResult<Sale> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        sale::fetch_with_items(conn.as_mut(), sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))
    }

    /// Lists sales matching the filter, newest first by default.
    ///
    /// ## Sorting
    /// `sort` takes `"field"` or `"field,desc"` with fields `date`,
    /// `total`, and `customer`. Anything unrecognized falls back to
    /// `date,desc`. The field list is fixed; sort input never reaches
    /// the SQL as-is.
    pub async fn list(
        &self,
        filter: &SaleFilter,
        sort: Option<&str>,
        page: u32,
        size: u32,
    ) -> CoreResult<PageResponse<Sale>> {
        let size = size.max(1);
        let order_by = parse_sort(sort);

        debug!(page, size, order_by, "Listing sales");

        let total_elements: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM sales s {FILTER_WHERE}"
        ))
        .bind(ts_or(filter.start, MIN_TS))
        .bind(ts_or(filter.end, MAX_TS))
        .bind(&filter.customer_id)
        .bind(filter.payment_method.map(|m| m.as_str()))
        .bind(&filter.product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT s.id, s.customer_id, c.name AS customer_name, s.payment_method,
                   s.total_value, s.note, s.created_at
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            {FILTER_WHERE}
            ORDER BY {order_by}
            LIMIT ?6 OFFSET ?7
            "#
        ))
        .bind(ts_or(filter.start, MIN_TS))
        .bind(ts_or(filter.end, MAX_TS))
        .bind(&filter.customer_id)
        .bind(filter.payment_method.map(|m| m.as_str()))
        .bind(&filter.product_id)
        .bind(i64::from(size))
        .bind(i64::from(page) * i64::from(size))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let mut content = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut loaded = sale::sale_from_row(row)?;
            loaded.items = sale::fetch_items(conn.as_mut(), &loaded.id).await?;
            content.push(loaded);
        }

        let total_pages = (total_elements + i64::from(size) - 1) / i64::from(size);

        Ok(PageResponse {
            content,
            number: page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: i64::from(page) + 1 >= total_pages,
        })
    }

    /// Sums the total value of every sale matching the filter.
    pub async fn gross_total(&self, filter: &SaleFilter) -> CoreResult<Money> {
        let totals = self.filtered_totals(filter).await?;
        Ok(totals
            .into_iter()
            .fold(Money::zero(), |acc, (_, total)| acc + total))
    }

    /// Revenue per group within the filter window.
    ///
    /// `group_by` accepts `"date"` (per UTC calendar day) and
    /// `"customer"` (per identified customer; anonymous sales are
    /// excluded). Unknown keys return an empty list.
    pub async fn summary(
        &self,
        filter: &SaleFilter,
        group_by: &str,
    ) -> CoreResult<Vec<GroupSummary>> {
        match group_by {
            "date" => {
                let mut by_day: Vec<(String, Money)> = Vec::new();
                for (row, total) in self.filtered_rows("substr(s.created_at, 1, 10)", filter).await? {
                    match by_day.iter_mut().find(|(day, _)| *day == row) {
                        Some((_, acc)) => *acc += total,
                        None => by_day.push((row, total)),
                    }
                }
                by_day.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(by_day
                    .into_iter()
                    .map(|(day, total)| GroupSummary {
                        key: day.clone(),
                        label: day,
                        total,
                    })
                    .collect())
            }
            "customer" => self.summary_by_customer(filter).await,
            other => {
                debug!(group_by = other, "Unknown summary grouping, returning empty");
                Ok(Vec::new())
            }
        }
    }

    /// Revenue per payment method within the window.
    ///
    /// Only methods with at least one sale appear; the dashboard's
    /// zero-filled variant is [`Self::dashboard_summary`].
    pub async fn totals_by_payment_method(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> CoreResult<Vec<PaymentMethodTotal>> {
        let filter = SaleFilter {
            start,
            end,
            ..SaleFilter::default()
        };
        let totals = self.method_totals(&filter).await?;

        Ok(PaymentMethod::ALL
            .iter()
            .filter_map(|method| {
                totals.get(method).map(|total| PaymentMethodTotal {
                    payment_method: *method,
                    total: *total,
                })
            })
            .collect())
    }

    /// The full dashboard rollup for one window.
    pub async fn dashboard_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> CoreResult<DashboardSummary> {
        let filter = SaleFilter {
            start,
            end,
            ..SaleFilter::default()
        };

        let totals = self.filtered_totals(&filter).await?;
        let sale_count = totals.len() as i64;
        let gross_total = totals
            .iter()
            .fold(Money::zero(), |acc, (_, total)| acc + *total);
        let average_ticket = gross_total.divided_by(sale_count);

        let method_totals = self.method_totals(&filter).await?;
        let totals_by_method = PaymentMethod::ALL
            .iter()
            .map(|method| PaymentMethodTotal {
                payment_method: *method,
                total: method_totals.get(method).copied().unwrap_or_default(),
            })
            .collect();

        let daily = self.summary(&filter, "date").await?;
        let daily_totals = daily
            .into_iter()
            .map(|group| DailyTotal {
                day: group.key,
                total: group.total,
            })
            .collect();

        let best_seller = self.best_seller(start, end).await?;

        Ok(DashboardSummary {
            gross_total,
            sale_count,
            average_ticket,
            totals_by_method,
            best_seller,
            daily_totals,
        })
    }

    /// The product with the highest unit volume in the window.
    ///
    /// Ties break on revenue, higher first. `None` when the window has
    /// no sales.
    pub async fn best_seller(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> CoreResult<Option<BestSeller>> {
        let rows = sqlx::query(
            r#"
            SELECT si.product_id, si.product_name, si.unit_price, si.quantity
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            WHERE s.created_at >= ?1 AND s.created_at <= ?2
            "#,
        )
        .bind(ts_or(start, MIN_TS))
        .bind(ts_or(end, MAX_TS))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut ranked: Vec<BestSeller> = Vec::new();
        for row in &rows {
            let product_id: String = row.try_get("product_id").map_err(DbError::from)?;
            let product_name: String = row.try_get("product_name").map_err(DbError::from)?;
            let unit_price_raw: String = row.try_get("unit_price").map_err(DbError::from)?;
            let quantity_raw: String = row.try_get("quantity").map_err(DbError::from)?;

            let unit_price = codec::parse_money("unit_price", &unit_price_raw)?;
            let quantity = codec::parse_decimal("quantity", &quantity_raw)?;
            let value = unit_price.times(quantity);

            match ranked.iter_mut().find(|entry| entry.product_id == product_id) {
                Some(entry) => {
                    entry.total_quantity += quantity;
                    entry.total_value += value;
                }
                None => ranked.push(BestSeller {
                    product_id,
                    product_name,
                    total_quantity: quantity,
                    total_value: value,
                }),
            }
        }

        ranked.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(b.total_value.cmp(&a.total_value))
        });

        Ok(ranked.into_iter().next())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// `(sale id, total)` for every sale matching the filter.
    async fn filtered_totals(&self, filter: &SaleFilter) -> CoreResult<Vec<(String, Money)>> {
        self.filtered_rows("s.id", filter).await
    }

    /// `(key expression, total)` per matching sale.
    ///
    /// `key_expr` is one of a handful of fixed expressions chosen by
    /// callers in this module, never external input.
    async fn filtered_rows(
        &self,
        key_expr: &str,
        filter: &SaleFilter,
    ) -> CoreResult<Vec<(String, Money)>> {
        let rows = sqlx::query(&format!(
            "SELECT {key_expr} AS grouping_key, s.total_value FROM sales s {FILTER_WHERE}"
        ))
        .bind(ts_or(filter.start, MIN_TS))
        .bind(ts_or(filter.end, MAX_TS))
        .bind(&filter.customer_id)
        .bind(filter.payment_method.map(|m| m.as_str()))
        .bind(&filter.product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let key: String = row.try_get("grouping_key").map_err(DbError::from)?;
            let total_raw: String = row.try_get("total_value").map_err(DbError::from)?;
            out.push((key, codec::parse_money("total_value", &total_raw)?));
        }
        Ok(out)
    }

    async fn method_totals(
        &self,
        filter: &SaleFilter,
    ) -> CoreResult<HashMap<PaymentMethod, Money>> {
        let keyed = self.filtered_rows("s.payment_method", filter).await?;

        let mut totals: HashMap<PaymentMethod, Money> = HashMap::new();
        for (raw, total) in keyed {
            let method = PaymentMethod::parse(&raw).ok_or_else(|| {
                CoreError::Unexpected(format!("unknown payment method in storage: {raw}"))
            })?;
            *totals.entry(method).or_default() += total;
        }
        Ok(totals)
    }

    async fn summary_by_customer(&self, filter: &SaleFilter) -> CoreResult<Vec<GroupSummary>> {
        // INNER JOIN: anonymous sales have no group to land in.
        let rows = sqlx::query(&format!(
            r#"
            SELECT s.customer_id AS grouping_key, c.name AS customer_name, s.total_value
            FROM sales s
            INNER JOIN customers c ON c.id = s.customer_id
            {FILTER_WHERE}
            "#
        ))
        .bind(ts_or(filter.start, MIN_TS))
        .bind(ts_or(filter.end, MAX_TS))
        .bind(&filter.customer_id)
        .bind(filter.payment_method.map(|m| m.as_str()))
        .bind(&filter.product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut groups: Vec<GroupSummary> = Vec::new();
        for row in &rows {
            let key: String = row.try_get("grouping_key").map_err(DbError::from)?;
            let label: String = row.try_get("customer_name").map_err(DbError::from)?;
            let total_raw: String = row.try_get("total_value").map_err(DbError::from)?;
            let total = codec::parse_money("total_value", &total_raw)?;

            match groups.iter_mut().find(|group| group.key == key) {
                Some(group) => group.total += total,
                None => groups.push(GroupSummary { key, label, total }),
            }
        }
        groups.sort_by(|a, b| a.label.cmp(&b.label).then(a.key.cmp(&b.key)));
        Ok(groups)
    }
}

// =============================================================================
// Filter plumbing
// =============================================================================

/// Shared WHERE clause for every filtered query in this module.
///
/// Binds, in order: start ts, end ts, customer_id, payment_method,
/// product_id. `(?N IS NULL OR ...)` makes each optional criterion a
/// no-op when unset.
const FILTER_WHERE: &str = r#"
    WHERE s.created_at >= ?1 AND s.created_at <= ?2
      AND (?3 IS NULL OR s.customer_id = ?3)
      AND (?4 IS NULL OR s.payment_method = ?4)
      AND (?5 IS NULL OR EXISTS (
            SELECT 1 FROM sale_items si
            WHERE si.sale_id = s.id AND si.product_id = ?5
      ))
"#;

fn ts_or(ts: Option<DateTime<Utc>>, fallback: &str) -> String {
    ts.map(codec::format_timestamp)
        .unwrap_or_else(|| fallback.to_string())
}

/// Maps a `"field"` / `"field,desc"` sort request onto a fixed ORDER BY
/// fragment. Unrecognized fields fall back to newest-first.
fn parse_sort(sort: Option<&str>) -> &'static str {
    let Some(sort) = sort else {
        return "s.created_at DESC";
    };

    let mut parts = sort.splitn(2, ',');
    let field = parts.next().unwrap_or("").trim();
    let descending = parts
        .next()
        .map(|dir| dir.trim().eq_ignore_ascii_case("desc"))
        .unwrap_or(false);

    match (field, descending) {
        ("date", false) => "s.created_at ASC",
        ("date", true) => "s.created_at DESC",
        // CAST for numeric ordering; the column is a TEXT decimal.
        ("total", false) => "CAST(s.total_value AS REAL) ASC",
        ("total", true) => "CAST(s.total_value AS REAL) DESC",
        ("customer", false) => "c.name ASC",
        ("customer", true) => "c.name DESC",
        _ => "s.created_at DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_allow_list() {
        assert_eq!(parse_sort(None), "s.created_at DESC");
        assert_eq!(parse_sort(Some("date")), "s.created_at ASC");
        assert_eq!(parse_sort(Some("date,desc")), "s.created_at DESC");
        assert_eq!(parse_sort(Some("total,DESC")), "CAST(s.total_value AS REAL) DESC");
        assert_eq!(parse_sort(Some("customer")), "c.name ASC");
    }

    #[test]
    fn test_parse_sort_rejects_unknown_fields() {
        assert_eq!(parse_sort(Some("id; DROP TABLE sales")), "s.created_at DESC");
        assert_eq!(parse_sort(Some("")), "s.created_at DESC");
        assert_eq!(parse_sort(Some("note,asc")), "s.created_at DESC");
    }
}
