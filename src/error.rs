use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the season store, the table model and the metrics.
///
/// Missing data inside valid rows is never an error: metrics fold nulls into
/// their numerator/denominator accounting instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The season file for `year` does not exist.
    #[error("Data file not found: {}\nRun: {remediation}", .path.display())]
    NotFound {
        year: i32,
        path: PathBuf,
        remediation: String,
    },

    /// Every season in the requested range was missing.
    #[error("No data found for years {start}-{end}\nRun: {remediation}")]
    EmptyRange {
        start: i32,
        end: i32,
        remediation: String,
    },

    /// A projected or required column is not part of the table.
    #[error("unknown column '{column}' (available: {})", .available.join(", "))]
    Schema {
        column: String,
        available: Vec<String>,
    },

    #[error("unsupported season file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// True for the recoverable "season file missing" case that multi-season
    /// loads skip over.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
