//! Error types for almanac-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in almanac-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// The store file is missing or cannot be opened
    #[error("store '{path}' is unavailable: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A statement against a single table failed
    #[error("query on table '{table}' failed: {source}")]
    Sql {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Store-level SQLite error not tied to one table
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the store itself cannot be reached.
    ///
    /// Queries degrade every other failure to a "no data" result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StoreUnavailable { .. })
    }

    pub(crate) fn sql(table: &str, source: rusqlite::Error) -> Self {
        Error::Sql {
            table: table.to_string(),
            source,
        }
    }
}
