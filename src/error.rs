//! Error types shared by the table engine and the remote pull

use thiserror::Error;

/// A non-fatal problem found while parsing CSV text
///
/// Parse errors are collected next to the parsed table. None of them abort a
/// load: the affected row is either kept with best-effort field association
/// or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Row has a different number of cells than the header
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Row could not be decoded and was skipped
    #[error("line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// Header name appears more than once; later cells overwrite earlier ones
    #[error("duplicate column {name:?} at position {position}, later values overwrite earlier ones")]
    DuplicateColumn { name: String, position: usize },
}

/// Rejected column view transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column order must be a permutation of the table columns")]
    NotAPermutation,

    #[error("view state belongs to table generation {view}, but table is generation {table}")]
    StaleView { view: u64, table: u64 },
}

/// Failure of a remote usage-export pull
#[derive(Debug, Error)]
pub enum PullError {
    #[error("session is not authorized, log in again")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),

    #[error("pull timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("another pull is already writing to {0}")]
    InProgress(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
