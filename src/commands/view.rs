//! View command - Show a CSV file as a filtered, sorted table

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use std::path::PathBuf;

use super::utils::{self, ViewOptions};
use cursor_usage::recent::RecentFiles;
use cursor_usage::table::Projection;

/// Render the file at `path` (or the most recent one) as a table
pub fn execute(
    path: Option<PathBuf>,
    options: &ViewOptions,
    limit: Option<usize>,
    recent: &RecentFiles,
) -> Result<String> {
    let path = utils::resolve_input(path, recent)?;
    let mut loaded = utils::load_table(&path, recent)?;
    options.apply(&mut loaded.session)?;

    let projection = loaded.session.project(&options.resolvers())?;
    let mut output = render(&projection, limit);

    if let Some(warning) = utils::parse_warning(&loaded.errors) {
        output.push_str(&format!("\n{}", warning));
    }
    Ok(output)
}

/// Table of the projected rows followed by a count line
pub fn render(projection: &Projection<'_>, limit: Option<usize>) -> String {
    if projection.columns.is_empty() {
        return "No columns to show".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(projection.columns.iter().map(Cell::new));

    let shown = limit
        .unwrap_or(projection.rows.len())
        .min(projection.rows.len());
    for record in &projection.rows[..shown] {
        table.add_row(projection.columns.iter().map(|c| Cell::new(record.get(c))));
    }

    let mut output = table.to_string();
    let matching = projection.rows.len();
    if shown < matching {
        output.push_str(&format!("\n\nShowing {} of {} matching rows", shown, matching));
    } else {
        output.push_str(&format!("\n\n{} matching rows", matching));
    }
    if matching < projection.total_records {
        output.push_str(&format!(" ({} total)", projection.total_records));
    }
    if let Some(cost) = &projection.cost {
        output.push_str(&format!(", cost {}", utils::format_currency(&cost.total)));
    }

    output
}
