//! Tabular data engine
//!
//! Parsing, filtering, sorting, aggregation and column view state for
//! string-valued CSV tables.

pub mod aggregate;
pub mod columns;
pub mod export;
pub mod filter;
pub mod parser;
pub mod resolve;
pub mod sort;
pub mod value;
pub mod view;

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub use aggregate::{CostStats, ModelShare, ModelStats};
pub use columns::ColumnView;
pub use filter::{DateRange, FieldFilters, FilterEngine};
pub use parser::{parse, ParsedTable};
pub use resolve::{ColumnResolver, ExactName, NameContains, Resolvers};
pub use sort::{SortConfig, SortDirection};
pub use view::{project, Projection, Session, ViewState};

/// One data row, keyed by column name
///
/// Missing cells are stored as empty strings, never left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// Value of `column`, or `""` when the record has no such key
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A loaded table: header columns plus records, immutable once built
#[derive(Debug, Clone)]
pub struct TableData {
    columns: Vec<String>,
    records: Vec<Record>,
    generation: u64,
}

impl TableData {
    /// Build a table and give it a fresh generation number
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            columns,
            records,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Identifies this load; view state is tied to it
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_get_missing_is_empty() {
        let record: Record = [("a", "1")].into_iter().collect();
        assert_eq!(record.get("a"), "1");
        assert_eq!(record.get("b"), "");
    }

    #[test]
    fn test_generations_are_distinct() {
        let a = TableData::new(vec![], vec![]);
        let b = TableData::new(vec![], vec![]);
        assert_ne!(a.generation(), b.generation());
    }
}
