use std::path::PathBuf;
use thiserror::Error;

/// Result type for table loading and store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading incident or relation tables
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Table is missing a required column
    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: &'static str, column: String },

    /// Cell could not be interpreted for its column
    #[error("Invalid value '{value}' for column '{column}' at row {row}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),
}

impl StoreError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub fn invalid_value(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            row,
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
