//! Date range and per-column value filters

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::resolve::ColumnResolver;
use super::value::parse_date;
use super::Record;

/// Inclusive calendar-day range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// First instant of the start day
    fn lower(&self) -> Option<NaiveDateTime> {
        self.start.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Last millisecond of the end day
    fn upper(&self) -> Option<NaiveDateTime> {
        self.end
            .and_then(|d| NaiveTime::from_hms_milli_opt(23, 59, 59, 999).map(|t| d.and_time(t)))
    }

    /// Whether a cell value falls inside the range
    ///
    /// Values that are not dates never match a bounded range.
    pub fn contains(&self, value: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = parse_date(value) else {
            return false;
        };
        if self.lower().is_some_and(|lo| ts < lo) {
            return false;
        }
        if self.upper().is_some_and(|hi| ts > hi) {
            return false;
        }
        true
    }
}

/// Allowed values per column
///
/// A column with an empty selection is unrestricted. A selection that covers
/// every distinct value present is treated the same way, so "nothing
/// selected" and "everything selected" give identical results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilters {
    selections: BTreeMap<String, BTreeSet<String>>,
}

impl FieldFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for `column`
    pub fn set<I, S>(&mut self, column: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        let column = column.into();
        if values.is_empty() {
            self.selections.remove(&column);
        } else {
            self.selections.insert(column, values);
        }
    }

    /// Flip one value in the selection for `column`
    pub fn toggle(&mut self, column: &str, value: &str) {
        let selection = self.selections.entry(column.to_string()).or_default();
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        if selection.is_empty() {
            self.selections.remove(column);
        }
    }

    pub fn clear(&mut self, column: &str) {
        self.selections.remove(column);
    }

    pub fn selection(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.selections.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Sorted distinct non-empty values of a column
pub fn distinct_values(records: &[&Record], column: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get(column))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Values containing `query`, ignoring case. A blank query keeps everything.
pub fn search_values<'v>(values: &'v [String], query: &str) -> Vec<&'v str> {
    let query = query.trim().to_lowercase();
    values
        .iter()
        .map(String::as_str)
        .filter(|v| query.is_empty() || v.to_lowercase().contains(&query))
        .collect()
}

/// Applies date range and field filters to records
pub struct FilterEngine<'r> {
    date_column: &'r dyn ColumnResolver,
}

impl<'r> FilterEngine<'r> {
    pub fn new(date_column: &'r dyn ColumnResolver) -> Self {
        Self { date_column }
    }

    /// Records passing every active predicate, in input order
    pub fn apply<'a>(
        &self,
        columns: &[String],
        records: &[&'a Record],
        range: &DateRange,
        filters: &FieldFilters,
    ) -> Vec<&'a Record> {
        let date_column = if range.is_unbounded() {
            None
        } else {
            let resolved = self.date_column.resolve(columns);
            if resolved.is_none() {
                tracing::debug!("no date column, ignoring date range");
            }
            resolved
        };

        let active: Vec<(&str, &BTreeSet<String>)> = filters
            .iter()
            .filter(|(column, allowed)| {
                if !columns.iter().any(|c| c == column) {
                    tracing::debug!(column, "filter on unknown column ignored");
                    return false;
                }
                !covers_all(allowed, records, column)
            })
            .collect();

        records
            .iter()
            .copied()
            .filter(|record| {
                date_column
                    .as_deref()
                    .map_or(true, |column| range.contains(record.get(column)))
            })
            .filter(|record| {
                active
                    .iter()
                    .all(|(column, allowed)| allowed.contains(record.get(column)))
            })
            .collect()
    }
}

/// Whether a selection includes every distinct non-empty value of `column`
fn covers_all(allowed: &BTreeSet<String>, records: &[&Record], column: &str) -> bool {
    let present: HashSet<&str> = records
        .iter()
        .map(|r| r.get(column))
        .filter(|v| !v.is_empty())
        .collect();
    present.iter().all(|v| allowed.contains(*v))
}
