//! View state and the projection of a table through it
//!
//! [`TableData`] never changes after loading. Everything the user adjusts
//! (sort, filters, columns) lives in [`ViewState`], which is tied to one table
//! generation. [`project`] combines the two without mutating either.

use super::aggregate::{cost_stats, model_stats, CostStats, ModelStats};
use super::columns::ColumnView;
use super::filter::{DateRange, FieldFilters, FilterEngine};
use super::resolve::Resolvers;
use super::sort::{self, SortConfig};
use super::{Record, TableData};
use crate::error::ViewError;

/// User-adjustable state for one loaded table
#[derive(Debug, Clone)]
pub struct ViewState {
    generation: u64,
    pub sort: SortConfig,
    pub date_range: DateRange,
    pub filters: FieldFilters,
    pub columns: ColumnView,
}

impl ViewState {
    /// Default view: unsorted, unfiltered, every column shown
    pub fn for_table(table: &TableData) -> Self {
        Self {
            generation: table.generation(),
            sort: SortConfig::default(),
            date_range: DateRange::default(),
            filters: FieldFilters::default(),
            columns: ColumnView::new(table.columns()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset(&mut self) {
        self.sort.reset();
        self.date_range = DateRange::default();
        self.filters = FieldFilters::default();
        self.columns.reset();
    }
}

/// What to render for a table under a view
#[derive(Debug)]
pub struct Projection<'a> {
    /// Displayed columns, in display order
    pub columns: Vec<String>,
    /// Filtered and sorted records
    pub rows: Vec<&'a Record>,
    /// Records in the table before filtering
    pub total_records: usize,
    pub cost_column: Option<String>,
    pub cost: Option<CostStats>,
    pub model_column: Option<String>,
    pub models: Option<ModelStats>,
}

/// Filter, sort and summarize `table` according to `view`
///
/// Statistics cover the filtered records. Fails only if `view` was built for
/// a different table.
pub fn project<'a>(
    table: &'a TableData,
    view: &ViewState,
    resolvers: &Resolvers,
) -> Result<Projection<'a>, ViewError> {
    if view.generation != table.generation() {
        return Err(ViewError::StaleView {
            view: view.generation,
            table: table.generation(),
        });
    }

    let all: Vec<&Record> = table.records().iter().collect();
    let filtered = FilterEngine::new(&*resolvers.date).apply(
        table.columns(),
        &all,
        &view.date_range,
        &view.filters,
    );

    let cost_column = resolvers.cost.resolve(table.columns());
    let model_column = resolvers.model.resolve(table.columns());
    let cost = cost_column
        .as_deref()
        .and_then(|c| cost_stats(&filtered, c));
    let models = model_column
        .as_deref()
        .and_then(|m| model_stats(&filtered, m, cost_column.as_deref()));

    let date_column = resolvers.date.resolve(table.columns());
    let rows = sort::apply(&filtered, &view.sort, date_column.as_deref());

    Ok(Projection {
        columns: view
            .columns
            .displayed()
            .into_iter()
            .map(str::to_string)
            .collect(),
        rows,
        total_records: table.records().len(),
        cost_column,
        cost,
        model_column,
        models,
    })
}

/// A loaded table together with its view state
#[derive(Debug)]
pub struct Session {
    table: TableData,
    view: ViewState,
}

impl Session {
    pub fn new(table: TableData) -> Self {
        let view = ViewState::for_table(&table);
        Self { table, view }
    }

    /// Swap in a new table; the view starts over
    pub fn load(&mut self, table: TableData) {
        self.view = ViewState::for_table(&table);
        self.table = table;
    }

    pub fn table(&self) -> &TableData {
        &self.table
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn project(&self, resolvers: &Resolvers) -> Result<Projection<'_>, ViewError> {
        project(&self.table, &self.view, resolvers)
    }
}
