//! Column resolution strategies
//!
//! Several features key off a designated column: the date range applies to
//! "the date column", cost statistics read "the cost column", and so on. The
//! column is chosen by a [`ColumnResolver`], so callers can keep the default
//! name heuristics or pin an exact column.

/// Picks one column out of a table's column list
pub trait ColumnResolver {
    fn resolve(&self, columns: &[String]) -> Option<String>;
}

impl<F> ColumnResolver for F
where
    F: Fn(&[String]) -> Option<String>,
{
    fn resolve(&self, columns: &[String]) -> Option<String> {
        self(columns)
    }
}

/// First column whose name contains `needle`, ignoring case
#[derive(Debug, Clone)]
pub struct NameContains(pub String);

impl NameContains {
    pub fn new(needle: &str) -> Self {
        Self(needle.to_lowercase())
    }
}

impl ColumnResolver for NameContains {
    fn resolve(&self, columns: &[String]) -> Option<String> {
        columns
            .iter()
            .find(|c| c.to_lowercase().contains(&self.0))
            .cloned()
    }
}

/// Column with exactly this name, if the table has it
#[derive(Debug, Clone)]
pub struct ExactName(pub String);

impl ColumnResolver for ExactName {
    fn resolve(&self, columns: &[String]) -> Option<String> {
        columns.iter().find(|c| **c == self.0).cloned()
    }
}

/// Whether a column name marks it as holding dates
///
/// Used by the sort comparator, which only tries date comparison on columns
/// named like dates.
pub fn is_date_column(name: &str) -> bool {
    name.to_lowercase().contains("date")
}

/// The set of resolvers used across filtering and aggregation
pub struct Resolvers {
    pub date: Box<dyn ColumnResolver>,
    pub cost: Box<dyn ColumnResolver>,
    pub model: Box<dyn ColumnResolver>,
}

impl Default for Resolvers {
    fn default() -> Self {
        Self {
            date: Box::new(NameContains::new("date")),
            cost: Box::new(NameContains::new("cost")),
            model: Box::new(NameContains::new("model")),
        }
    }
}

impl Resolvers {
    /// Replace any of the default heuristics with exact column names
    pub fn with_overrides(
        date: Option<String>,
        cost: Option<String>,
        model: Option<String>,
    ) -> Self {
        let mut resolvers = Self::default();
        if let Some(name) = date {
            resolvers.date = Box::new(ExactName(name));
        }
        if let Some(name) = cost {
            resolvers.cost = Box::new(ExactName(name));
        }
        if let Some(name) = model {
            resolvers.model = Box::new(ExactName(name));
        }
        resolvers
    }
}
