//! Typed, stable record sorting
//!
//! Values of the sort column are compared as dates (only on columns named
//! like dates, or the resolved date column), then as numbers (a leading `$`
//! is allowed), then as text. Each value is classified once
//! into a [`SortKey`] so that mixed columns still get a total order: dates
//! before numbers before text.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use super::resolve::is_date_column;
use super::value::{parse_date, parse_number};
use super::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Which column to sort by, and which way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Handle a user request to sort by `key`
    ///
    /// Requesting the current key again flips the direction; a new key
    /// starts ascending.
    pub fn request(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey<'a> {
    Date(NaiveDateTime),
    Number(f64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn classify(value: &'a str, date_column: bool) -> Self {
        if date_column {
            if let Some(ts) = parse_date(value) {
                return Self::Date(ts);
            }
        }
        let number = parse_number(value)
            .or_else(|| value.trim().strip_prefix('$').and_then(parse_number));
        match number {
            Some(n) => Self::Number(n),
            None => Self::Text(value),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Date(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => collate(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Human-friendly text ordering
///
/// Case-insensitive first; on a tie lowercase sorts before uppercase, then
/// plain byte order.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Records ordered by `config`; equal keys keep their input order
///
/// `date_column` is the column the date resolver picked, if any. Sorting by
/// it compares dates even when its name does not look like one.
pub fn apply<'a>(
    records: &[&'a Record],
    config: &SortConfig,
    date_column: Option<&str>,
) -> Vec<&'a Record> {
    let Some(key) = config.key.as_deref() else {
        return records.to_vec();
    };

    let date_column = is_date_column(key) || date_column == Some(key);
    let mut keyed: Vec<(SortKey<'a>, &'a Record)> = records
        .iter()
        .map(|record| (SortKey::classify(record.get(key), date_column), *record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b);
        match config.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::testutil::{column_of, table};

    fn sorted_column(rows: &[&str], column: &str, config: &SortConfig) -> Vec<String> {
        let rows: Vec<Vec<&str>> = rows.iter().map(|v| vec![*v]).collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        let t = table(&[column], &rows);
        let records: Vec<&Record> = t.records().iter().collect();
        column_of(&apply(&records, config, None), column)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_no_key_keeps_order() {
        let out = sorted_column(&["b", "a", "c"], "x", &SortConfig::default());
        assert_eq!(out, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_numeric_not_lexical() {
        let config = SortConfig::by("n", SortDirection::Ascending);
        let out = sorted_column(&["10", "9", "100", "-1"], "n", &config);
        assert_eq!(out, vec!["-1", "9", "10", "100"]);
    }

    #[test]
    fn test_dates_on_date_column() {
        let config = SortConfig::by("Date", SortDirection::Ascending);
        let out = sorted_column(
            &["2025-10-02", "2025-09-30T23:00:00Z", "10/01/2025"],
            "Date",
            &config,
        );
        assert_eq!(out, vec!["2025-09-30T23:00:00Z", "10/01/2025", "2025-10-02"]);
    }

    #[test]
    fn test_dates_ignored_on_other_columns() {
        // Without a date-like name these fall through to text collation
        let config = SortConfig::by("when", SortDirection::Ascending);
        let out = sorted_column(&["2025-10-02", "10/01/2025"], "when", &config);
        assert_eq!(out, vec!["10/01/2025", "2025-10-02"]);
    }

    #[test]
    fn test_resolved_date_column_sorts_as_dates() {
        let config = SortConfig::by("when", SortDirection::Ascending);
        let t = table(&["when"], &[&["10/01/2025"], &["2025-09-30"]]);
        let records: Vec<&Record> = t.records().iter().collect();
        let by_date = apply(&records, &config, Some("when"));
        assert_eq!(column_of(&by_date, "when"), vec!["2025-09-30", "10/01/2025"]);
        let as_text = apply(&records, &config, None);
        assert_eq!(column_of(&as_text, "when"), vec!["10/01/2025", "2025-09-30"]);
    }

    #[test]
    fn test_dollar_amounts_sort_numerically() {
        let config = SortConfig::by("Cost", SortDirection::Ascending);
        let out = sorted_column(&["$10.00", "$9.00", "bad", "$0.50", "2"], "Cost", &config);
        assert_eq!(out, vec!["$0.50", "2", "$9.00", "$10.00", "bad"]);
    }

    #[test]
    fn test_text_collation() {
        let config = SortConfig::by("name", SortDirection::Ascending);
        let out = sorted_column(&["banana", "Apple", "apple", "Cherry"], "name", &config);
        assert_eq!(out, vec!["apple", "Apple", "banana", "Cherry"]);
    }

    #[test]
    fn test_mixed_values_numbers_before_text() {
        let config = SortConfig::by("v", SortDirection::Ascending);
        let out = sorted_column(&["x", "3", "", "1"], "v", &config);
        assert_eq!(out, vec!["1", "3", "", "x"]);
    }

    #[test]
    fn test_descending_reverses_distinct_values() {
        let rows = ["3", "1", "2", "10"];
        let asc = sorted_column(&rows, "v", &SortConfig::by("v", SortDirection::Ascending));
        let mut desc = sorted_column(&rows, "v", &SortConfig::by("v", SortDirection::Descending));
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let t = table(
            &["k", "id"],
            &[&["1", "a"], &["0", "b"], &["1", "c"], &["0", "d"]],
        );
        let records: Vec<&Record> = t.records().iter().collect();
        let asc = apply(&records, &SortConfig::by("k", SortDirection::Ascending), None);
        assert_eq!(column_of(&asc, "id"), vec!["b", "d", "a", "c"]);
        let desc = apply(&records, &SortConfig::by("k", SortDirection::Descending), None);
        assert_eq!(column_of(&desc, "id"), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_idempotent() {
        let t = table(&["v"], &[&["b"], &["3"], &["a"], &["1"]]);
        let records: Vec<&Record> = t.records().iter().collect();
        let config = SortConfig::by("v", SortDirection::Descending);
        let once = apply(&records, &config, None);
        let twice = apply(&once, &config, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_request_toggles_same_key() {
        let mut config = SortConfig::default();
        config.request("Cost");
        assert_eq!(config, SortConfig::by("Cost", SortDirection::Ascending));
        config.request("Cost");
        assert_eq!(config.direction, SortDirection::Descending);
        config.request("Model");
        assert_eq!(config, SortConfig::by("Model", SortDirection::Ascending));
        config.reset();
        assert_eq!(config, SortConfig::default());
    }

    #[test]
    fn test_collate() {
        assert_eq!(collate("a", "B"), Ordering::Less);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }
}
