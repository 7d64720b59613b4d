//! Error types for tabular source operations.

use thiserror::Error;

/// Errors from decoding and reading a tabular source.
#[derive(Debug, Error)]
pub enum TabularError {
    /// No candidate encoding decoded the source without error.
    #[error("{source_name}: not decodable with any candidate encoding (tried: {})", tried.join(", "))]
    Encoding {
        source_name: String,
        tried: Vec<String>,
    },

    /// A required column is missing from the header (row 0) or from a data row.
    #[error("{source_name}: row {row}: missing required column '{column}'")]
    Schema {
        source_name: String,
        row: usize,
        column: String,
    },

    /// The source file could not be read at all.
    #[error("{source_name}: cannot read: {message}")]
    Unreadable {
        source_name: String,
        message: String,
    },

    /// An encoding label that no decoder recognizes.
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Malformed delimited text (e.g. unbalanced quoting reported by the CSV parser).
    #[error("{source_name}: {message}")]
    Csv {
        source_name: String,
        message: String,
    },
}

impl TabularError {
    /// Name of the source the error belongs to, if any.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            TabularError::Encoding { source_name, .. }
            | TabularError::Schema { source_name, .. }
            | TabularError::Unreadable { source_name, .. }
            | TabularError::Csv { source_name, .. } => Some(source_name),
            TabularError::UnknownEncoding(_) => None,
        }
    }
}

/// Result type for tabular operations.
pub type Result<T> = std::result::Result<T, TabularError>;
