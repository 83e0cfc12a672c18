//! # Column Codecs
//!
//! Helpers for the TEXT-encoded columns in the schema.
//!
//! SQLite has no native decimal or timezone-aware timestamp type, so
//! money and quantity columns are stored as decimal strings and
//! timestamps as RFC 3339 strings (always UTC, `+00:00` offset).
//! Storing timestamps with a fixed offset keeps lexicographic ordering
//! equal to chronological ordering, which the range filters rely on.

use balcao_core::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

/// Parses a TEXT money column.
pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    parse_decimal(column, raw).map(Money::new)
}

/// Parses a TEXT decimal column (quantities, limits, balances).
pub(crate) fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| DbError::decode(column, format!("'{raw}' is not a decimal: {e}")))
}

/// Parses a TEXT timestamp column (RFC 3339, UTC).
pub(crate) fn parse_timestamp(column: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::decode(column, format!("'{raw}' is not RFC 3339: {e}")))
}

/// Formats a timestamp for storage.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let stored = format_timestamp(now);
        let parsed = parse_timestamp("created_at", &stored).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        let err = parse_decimal("stock_quantity", "not-a-number").unwrap_err();
        assert!(matches!(err, DbError::Decode { .. }));
    }

    #[test]
    fn test_money_parses_two_decimal_places() {
        let money = parse_money("total_value", "51.00").unwrap();
        assert_eq!(money.to_string(), "51.00");
    }
}
