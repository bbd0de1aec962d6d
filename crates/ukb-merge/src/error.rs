//! Error types for merging.

use thiserror::Error;

/// Errors from a single merge step. The accumulated table is left as it was.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Extract does not carry the identifier column.
    #[error("extract has no '{column}' identifier column")]
    MissingIdColumn { column: String },

    /// Extract has no columns besides the identifier.
    #[error("extract has no data columns besides '{column}'")]
    NoDataColumns { column: String },

    /// Extract column collides with an accumulated column.
    #[error("column '{column}' is already present in the merged table")]
    DuplicateColumn { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for MergeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
