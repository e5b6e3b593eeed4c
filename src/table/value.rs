//! Typed interpretation of cell strings
//!
//! Cells are stored as strings. Sorting, filtering and aggregation read them
//! as dates, numbers or money through these helpers, all of which return
//! `None` for values that do not parse instead of failing.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::str::FromStr;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a cell as a timestamp
///
/// Values with an offset (RFC 3339, e.g. `2025-10-01T08:00:00.000Z`) are
/// converted to UTC. Values without one are taken as written. Bare dates map
/// to midnight.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a cell as a finite number
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Largest decimal exponent accepted for a money amount, either way.
/// Cells beyond it do not parse as costs.
pub const MAX_COST_EXPONENT: i64 = 18;

/// Parse a cell as a money amount, dropping one leading `$`
pub fn parse_cost(value: &str) -> Option<BigDecimal> {
    let value = value.trim();
    let value = value.strip_prefix('$').unwrap_or(value).trim_start();
    if value.is_empty() {
        return None;
    }
    let amount = BigDecimal::from_str(value).ok()?;
    let (_, scale) = amount.as_bigint_and_exponent();
    if scale.abs() > MAX_COST_EXPONENT {
        tracing::debug!(value, "cost exponent out of range");
        return None;
    }
    Some(amount)
}
