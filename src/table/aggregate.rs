//! Summary statistics over a record set
//!
//! Money is summed as [`BigDecimal`] so long columns of cents do not drift.

use bigdecimal::BigDecimal;
use std::collections::HashMap;

use super::value::parse_cost;
use super::Record;

/// Label for records with no model value
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Statistics over the parseable values of a cost column
#[derive(Debug, Clone, PartialEq)]
pub struct CostStats {
    pub total: BigDecimal,
    pub avg: BigDecimal,
    pub max: BigDecimal,
    pub min: BigDecimal,
    /// Number of values that parsed, not the number of records
    pub count: usize,
}

/// One model's share of the records
#[derive(Debug, Clone, PartialEq)]
pub struct ModelShare {
    pub name: String,
    pub count: usize,
    /// Summed cost, present when the table has a cost column
    pub cost: Option<BigDecimal>,
    /// Share of all records, 0-100
    pub percentage: f64,
}

/// Distribution of records over the model column
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStats {
    /// Ordered by descending count, ties in first-seen order
    pub models: Vec<ModelShare>,
    /// Number of records the distribution covers
    pub total: usize,
}

/// Total, average, max and min of `cost_column`
///
/// Values that do not parse as money are left out. Returns `None` when no
/// value parses.
pub fn cost_stats(records: &[&Record], cost_column: &str) -> Option<CostStats> {
    let mut values = records.iter().filter_map(|r| parse_cost(r.get(cost_column)));

    let first = values.next()?;
    let mut total = first.clone();
    let mut max = first.clone();
    let mut min = first;
    let mut count = 1usize;

    for value in values {
        total += &value;
        if value > max {
            max = value.clone();
        }
        if value < min {
            min = value;
        }
        count += 1;
    }

    let avg = &total / BigDecimal::from(count as u64);
    Some(CostStats {
        total,
        avg,
        max,
        min,
        count,
    })
}

/// Record counts (and optionally summed cost) per model
///
/// Empty model values are counted under [`UNKNOWN_MODEL`]. Returns `None` for
/// an empty record set.
pub fn model_stats(
    records: &[&Record],
    model_column: &str,
    cost_column: Option<&str>,
) -> Option<ModelStats> {
    if records.is_empty() {
        return None;
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(&str, usize, BigDecimal)> = Vec::new();

    for record in records {
        let raw = record.get(model_column);
        let name = if raw.trim().is_empty() {
            UNKNOWN_MODEL
        } else {
            raw
        };

        let slot = *index.entry(name).or_insert_with(|| {
            buckets.push((name, 0, BigDecimal::default()));
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.1 += 1;
        if let Some(cost) = cost_column.and_then(|c| parse_cost(record.get(c))) {
            bucket.2 += cost;
        }
    }

    // Stable, so equal counts stay in first-seen order
    buckets.sort_by(|a, b| b.1.cmp(&a.1));

    let total = records.len();
    let models = buckets
        .into_iter()
        .map(|(name, count, cost)| ModelShare {
            name: name.to_string(),
            count,
            cost: cost_column.map(|_| cost),
            percentage: 100.0 * count as f64 / total as f64,
        })
        .collect();

    Some(ModelStats { models, total })
}
