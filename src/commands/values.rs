//! Values command - Distinct values of a column, for building filters

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use std::collections::HashMap;
use std::path::PathBuf;

use super::utils;
use cursor_usage::error::ViewError;
use cursor_usage::recent::RecentFiles;
use cursor_usage::table::filter::{distinct_values, search_values};
use cursor_usage::table::Record;

/// List the distinct non-empty values of `column` with their row counts,
/// optionally narrowed to values containing `search`
pub fn execute(
    path: Option<PathBuf>,
    column: &str,
    search: Option<&str>,
    recent: &RecentFiles,
) -> Result<String> {
    let path = utils::resolve_input(path, recent)?;
    let loaded = utils::load_table(&path, recent)?;
    let table = loaded.session.table();

    if !table.columns().iter().any(|c| c == column) {
        return Err(ViewError::UnknownColumn(column.to_string()).into());
    }

    let records: Vec<&Record> = table.records().iter().collect();
    let values = distinct_values(&records, column);
    if values.is_empty() {
        return Ok(format!("Column {:?} has no values", column));
    }
    let shown = match search {
        Some(query) => search_values(&values, query),
        None => values.iter().map(String::as_str).collect(),
    };
    if shown.is_empty() {
        return Ok(format!(
            "No values in {:?} match {:?} ({} distinct values)",
            column,
            search.unwrap_or_default(),
            values.len()
        ));
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut empty = 0;
    for record in &records {
        match record.get(column) {
            "" => empty += 1,
            value => *counts.entry(value).or_default() += 1,
        }
    }

    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec![Cell::new(column), Cell::new("Rows")]);
    for value in &shown {
        let count = counts.get(value).copied().unwrap_or(0);
        out.add_row(vec![
            Cell::new(value),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut output = out.to_string();
    if shown.len() < values.len() {
        output.push_str(&format!(
            "\n\n{} of {} distinct values",
            shown.len(),
            values.len()
        ));
    } else {
        output.push_str(&format!("\n\n{} distinct values", values.len()));
    }
    if empty > 0 {
        output.push_str(&format!(", {} empty", empty));
    }
    Ok(output)
}
