//! Export command - Write the current view of a table as CSV

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use super::utils::{self, ViewOptions};
use cursor_usage::recent::RecentFiles;
use cursor_usage::storage;
use cursor_usage::table::export;

/// Export the matching rows and displayed columns; returns the row count
///
/// Writes to `output` when given, otherwise to stdout.
pub fn execute(
    path: PathBuf,
    options: &ViewOptions,
    output: Option<&Path>,
    recent: &RecentFiles,
) -> Result<usize> {
    let mut loaded = utils::load_table(&path, recent)?;
    options.apply(&mut loaded.session)?;
    let projection = loaded.session.project(&options.resolvers())?;

    match output {
        Some(out) => {
            let csv = export::to_csv_string(&projection)?;
            storage::write_atomic(out, csv.as_bytes())
                .with_context(|| format!("Failed to write: {}", out.display()))?;
        }
        None => export::write_csv(&projection, io::stdout().lock())?,
    }

    Ok(projection.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::utils::testutil::{csv_file, USAGE_CSV};
    use std::fs;

    #[test]
    fn test_export_view_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let (path, recent) = csv_file(dir.path(), "usage.csv", USAGE_CSV);
        let out = dir.path().join("out").join("included.csv");
        let options = ViewOptions {
            filters: vec!["Kind=Included".parse().unwrap()],
            columns: vec!["Model".to_string(), "Cost".to_string()],
            hide: vec!["Date".to_string(), "Kind".to_string()],
            sort: Some("Cost".to_string()),
            ..Default::default()
        };

        let count = execute(path, &options, Some(&out), &recent).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "Model,Cost\n,$0.50\ngpt-4,$1.00\nclaude,$2.50\n"
        );
    }

    #[test]
    fn test_export_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let recent = RecentFiles::new(dir.path().join("recent.json"));
        let out = dir.path().join("out.csv");
        let result = execute(
            dir.path().join("nope.csv"),
            &ViewOptions::default(),
            Some(&out),
            &recent,
        );
        assert!(result.is_err());
        assert!(!out.exists());
    }
}
