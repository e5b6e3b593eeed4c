//! Shared utilities for commands

use anyhow::{bail, Context, Result};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use clap::Args;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cursor_usage::error::{ParseError, ViewError};
use cursor_usage::recent::{RecentFile, RecentFiles};
use cursor_usage::table::{self, DateRange, Resolvers, Session, SortConfig, SortDirection};

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a money amount as dollars with two decimals
pub fn format_currency(amount: &BigDecimal) -> String {
    format!("${}", amount.round(2).with_scale(2))
}

/// Format a unix timestamp in local time
pub fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

/// `--filter COLUMN=V1,V2`
///
/// Values are read as one CSV record, so a value holding a comma is written
/// in double quotes (`Model="a, b",c`). Surrounding whitespace is trimmed
/// from every value, quoted or not, and empty values are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub column: String,
    pub values: Vec<String>,
}

impl FromStr for FilterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, values) = s
            .split_once('=')
            .ok_or_else(|| format!("expected COLUMN=VALUE[,VALUE...], got {:?}", s))?;
        let column = column.trim();
        if column.is_empty() {
            return Err("filter column name is empty".to_string());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(values.as_bytes());
        let values = match reader.records().next() {
            Some(record) => record
                .map_err(|e| format!("invalid filter values {:?}: {}", values, e))?
                .iter()
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };
        Ok(Self {
            column: column.to_string(),
            values,
        })
    }
}

/// Flags that shape what part of a table is shown
#[derive(Debug, Clone, Default, Args)]
pub struct ViewOptions {
    /// Sort by this column
    #[arg(long, short)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Keep rows dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep rows dated on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Keep rows whose COLUMN is one of the values; repeat to add columns
    /// or more values, quote values containing commas
    #[arg(long = "filter", short = 'f', value_name = "COLUMN=V1,V2")]
    pub filters: Vec<FilterArg>,

    /// Show these columns first, in this order
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Hide these columns
    #[arg(long, value_delimiter = ',')]
    pub hide: Vec<String>,

    /// Use this column for dates instead of the first one named like "date"
    #[arg(long)]
    pub date_column: Option<String>,

    /// Use this column for costs instead of the first one named like "cost"
    #[arg(long)]
    pub cost_column: Option<String>,

    /// Use this column for models instead of the first one named like "model"
    #[arg(long)]
    pub model_column: Option<String>,
}

impl ViewOptions {
    pub fn resolvers(&self) -> Resolvers {
        Resolvers::with_overrides(
            self.date_column.clone(),
            self.cost_column.clone(),
            self.model_column.clone(),
        )
    }

    /// Apply the flags to the session's view state
    pub fn apply(&self, session: &mut Session) -> Result<()> {
        let columns = session.table().columns().to_vec();
        let view = session.view_mut();

        if let Some(key) = &self.sort {
            if !columns.contains(key) {
                return Err(ViewError::UnknownColumn(key.clone()).into());
            }
            let direction = if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            view.sort = SortConfig::by(key.clone(), direction);
        }

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
        }
        view.date_range = DateRange::new(self.from, self.to);

        let mut selections: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for filter in &self.filters {
            selections
                .entry(filter.column.as_str())
                .or_default()
                .extend(filter.values.iter().cloned());
        }
        for (column, values) in selections {
            view.filters.set(column, values);
        }

        if !self.columns.is_empty() {
            view.columns
                .move_to_front(&self.columns)
                .context("Invalid --columns")?;
        }
        for column in &self.hide {
            if view.columns.is_visible(column) {
                view.columns
                    .toggle_visibility(column)
                    .context("Invalid --hide")?;
            } else if !columns.contains(column) {
                return Err(ViewError::UnknownColumn(column.clone()).into());
            }
        }

        Ok(())
    }
}

/// A CSV file read from disk and parsed
#[derive(Debug)]
pub struct LoadedFile {
    pub session: Session,
    pub errors: Vec<ParseError>,
}

/// Read and parse a CSV file, recording it in the recent-files list
pub fn load_table(path: &Path, recent: &RecentFiles) -> Result<LoadedFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            anyhow::anyhow!("File not found: {}", path.display())
        } else {
            anyhow::Error::new(e).context(format!("Failed to read: {}", path.display()))
        }
    })?;
    let size = content.len() as u64;

    let parsed = table::parse(&content);
    tracing::debug!(
        path = %path.display(),
        records = parsed.table.records().len(),
        errors = parsed.errors.len(),
        "loaded table"
    );

    remember(recent, path, size, parsed.table.records().len());

    Ok(LoadedFile {
        session: Session::new(parsed.table),
        errors: parsed.errors,
    })
}

/// Add a file to the recent list; a failure here never fails the command
pub fn remember(recent: &RecentFiles, path: &Path, size: u64, record_count: usize) {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let entry = RecentFile {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        path,
        size,
        record_count,
        opened_at: chrono::Utc::now().timestamp(),
    };
    if let Err(e) = recent.save(entry) {
        tracing::warn!("could not update recent files: {:#}", e);
    }
}

/// The given path, or the most recently opened file
pub fn resolve_input(path: Option<PathBuf>, recent: &RecentFiles) -> Result<PathBuf> {
    if let Some(path) = path {
        return Ok(path);
    }
    let latest = recent
        .list()
        .context("Failed to read recent files")?
        .into_iter()
        .next();
    match latest {
        Some(entry) => {
            tracing::info!(path = %entry.path.display(), "using most recent file");
            Ok(entry.path)
        }
        None => bail!("No file given and no recently opened files. Pass a CSV path."),
    }
}

/// One-line note about rows the parser had trouble with
pub fn parse_warning(errors: &[ParseError]) -> Option<String> {
    match errors {
        [] => None,
        [only] => Some(format!("1 parse problem: {}", only)),
        [first, rest @ ..] => Some(format!(
            "{} parse problems, first: {} (run with -v for all)",
            rest.len() + 1,
            first
        )),
    }
}
