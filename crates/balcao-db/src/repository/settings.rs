//! # Settings Repository
//!
//! Store-wide credit settings, kept as a single row (`id = 1`).
//!
//! The sale engine reads these once per engine instance; they tune how
//! fiado balances are interpreted (grace period, late interest) without
//! changing the limit check itself.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use balcao_core::CreditPolicy;

use crate::codec;
use crate::error::DbResult;

/// Repository for the store settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the current credit policy.
    ///
    /// Returns the default policy when the settings row has never been
    /// written.
    pub async fn credit_policy(&self) -> DbResult<CreditPolicy> {
        let row = sqlx::query(
            "SELECT credit_grace_period_months, late_interest_rate FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(CreditPolicy::default());
        };

        let rate: Option<String> = row.try_get("late_interest_rate")?;

        Ok(CreditPolicy {
            grace_period_months: row.try_get("credit_grace_period_months")?,
            late_interest_rate: rate
                .map(|raw| codec::parse_decimal("late_interest_rate", &raw))
                .transpose()?,
        })
    }

    /// Writes the credit policy, creating the settings row if needed.
    pub async fn save_credit_policy(&self, policy: &CreditPolicy) -> DbResult<()> {
        debug!(
            grace_period_months = ?policy.grace_period_months,
            "Saving credit policy"
        );

        sqlx::query(
            r#"
            INSERT INTO settings (id, credit_grace_period_months, late_interest_rate, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                credit_grace_period_months = excluded.credit_grace_period_months,
                late_interest_rate = excluded.late_interest_rate,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(policy.grace_period_months)
        .bind(policy.late_interest_rate.map(|r| r.to_string()))
        .bind(codec::format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
