//! Recent command - Show or clear recently opened files

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use super::utils;
use cursor_usage::recent::RecentFiles;

/// Table of recently opened files, newest first
pub fn list(recent: &RecentFiles) -> Result<String> {
    let entries = recent.list()?;
    if entries.is_empty() {
        return Ok("No recently opened files".to_string());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name"),
        Cell::new("Records"),
        Cell::new("Size"),
        Cell::new("Opened"),
        Cell::new("Path"),
    ]);

    for entry in &entries {
        let missing = if entry.path.exists() { "" } else { " (missing)" };
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(entry.record_count).set_alignment(CellAlignment::Right),
            Cell::new(utils::format_size(entry.size)).set_alignment(CellAlignment::Right),
            Cell::new(utils::format_timestamp(entry.opened_at)),
            Cell::new(format!("{}{}", entry.path.display(), missing)),
        ]);
    }

    let mut output = table.to_string();
    output.push_str(&format!("\n\n{} recent files", entries.len()));
    Ok(output)
}

/// Forget all recently opened files
pub fn clear(recent: &RecentFiles) -> Result<()> {
    recent.clear()
}
