use std::path::PathBuf;
use thiserror::Error;

/// Errors from the loader stage.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("required column '{column}' not found in {table}")]
    MissingColumn { column: String, table: String },

    /// `row` is the 1-based data row (header excluded) of the offending table.
    #[error("malformed record at row {row} (account '{account}'): {reason}")]
    MalformedRecord {
        row: usize,
        account: String,
        reason: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("cache error: {0}")]
    Cache(String),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(table: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            table: table.into(),
            source,
        }
    }

    /// Whether a `skip` policy may recover from this error.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
