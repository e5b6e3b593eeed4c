//! CSV text to records
//!
//! The first non-blank row is the header. Each following non-blank row
//! becomes one [`Record`], pairing cells with header names by position.
//! Problems are collected as [`ParseError`]s rather than aborting the load.

use csv::{ReaderBuilder, StringRecord, StringRecordsIter};
use std::collections::HashSet;

use super::{Record, TableData};
use crate::error::ParseError;

/// Result of parsing: the table plus every non-fatal problem found
#[derive(Debug)]
pub struct ParsedTable {
    pub table: TableData,
    pub errors: Vec<ParseError>,
}

/// Parse CSV text into a table
pub fn parse(text: &str) -> ParsedTable {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut errors = Vec::new();
    let mut rows = reader.records();

    let Some(header) = next_row(&mut rows, &mut errors) else {
        return ParsedTable {
            table: TableData::new(Vec::new(), Vec::new()),
            errors,
        };
    };
    let columns = unique_columns(&header, &mut errors);
    let mut records = Vec::new();

    while let Some(row) = next_row(&mut rows, &mut errors) {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() != header.len() {
            let err = ParseError::FieldCount {
                line,
                expected: header.len(),
                found: row.len(),
            };
            tracing::warn!("{}", err);
            errors.push(err);
        }

        // Positional pairing; with duplicate names the later cell wins
        let record: Record = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name, row.get(idx).unwrap_or("")))
            .collect();
        records.push(record);
    }

    tracing::debug!(
        columns = columns.len(),
        records = records.len(),
        errors = errors.len(),
        "parsed csv"
    );

    ParsedTable {
        table: TableData::new(columns, records),
        errors,
    }
}

/// Next non-blank row, recording and skipping rows the reader rejects
fn next_row<R: std::io::Read>(
    rows: &mut StringRecordsIter<'_, R>,
    errors: &mut Vec<ParseError>,
) -> Option<StringRecord> {
    for result in rows.by_ref() {
        match result {
            Ok(row) if is_blank(&row) => continue,
            Ok(row) => return Some(row),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                let err = ParseError::Malformed {
                    line,
                    message: e.to_string(),
                };
                tracing::warn!("{}", err);
                errors.push(err);
            }
        }
    }
    None
}

/// Empty or whitespace-only line
fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.iter().all(|f| f.trim().is_empty())
}

/// Header names in first-seen order, each once
fn unique_columns(header: &StringRecord, errors: &mut Vec<ParseError>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());

    for (position, name) in header.iter().enumerate() {
        if seen.insert(name) {
            columns.push(name.to_string());
        } else {
            let err = ParseError::DuplicateColumn {
                name: name.to_string(),
                position,
            };
            tracing::warn!("{}", err);
            errors.push(err);
        }
    }

    columns
}
