//! Error handling for incident processing operations.
//!
//! The taxonomy distinguishes fatal startup errors (weight table, input
//! scan) from per-file and per-row errors that are logged by the worker
//! pool and never escalate past their unit of work.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Weight table error at {path}: {reason}")]
    WeightTable { path: PathBuf, reason: String },

    #[error("Cannot scan input directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open input file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema mismatch in {path} line {line}: expected {expected} fields, found {found}")]
    SchemaMismatch {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Malformed row in {path} line {line}: {reason}")]
    RowParse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Export failed for {} output file(s): {}", .failures.len(), .failures.join("; "))]
    Export { failures: Vec<String> },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create a fatal weight table error
    pub fn weight_table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::WeightTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an interruption error
    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::Interrupted {
            reason: reason.into(),
        }
    }

    /// Whether the error makes the whole run meaningless.
    ///
    /// Per-file and per-row errors are handled inside the worker pool and
    /// never reach the caller; everything that does reach the caller except
    /// export partial failures is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Export { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
