use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the dataset store and every operation routed through it.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An operation needed a table but the store is empty.
    #[error("no dataset loaded yet, please load the dataset first")]
    NotLoaded,

    /// No readable dataset file was located.
    #[error("no dataset file found at {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The file exists but could not be read into a table.
    #[error("failed to load dataset from {}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A table handed to the store is not well formed.
    #[error("invalid table: {0}")]
    InvalidInput(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{column}', row {row}: expected a number, found '{value}'")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{0}' has no numeric values")]
    EmptyColumn(String),
}

pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
