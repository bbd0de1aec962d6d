//! Error types for table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the dictionary or a table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Table or dictionary file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Dictionary Errors ===
    /// Dictionary has no header row.
    #[error("dictionary is empty: {path}")]
    EmptyDictionary { path: PathBuf },

    /// Dictionary header is narrower than the positional layout requires.
    #[error("dictionary {path} has {found} columns, at least {required} are required")]
    DictionaryFormat {
        path: PathBuf,
        found: usize,
        required: usize,
    },

    // === CSV Parsing Errors ===
    /// Delimited-text parse failure.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header line.
    #[error("table is empty: {path}")]
    EmptyTable { path: PathBuf },

    /// No candidate delimiter splits the header into more than one column.
    #[error("could not detect a delimiter for {path}")]
    DelimiterNotDetected { path: PathBuf },

    // === DataFrame Errors ===
    /// Requested column is not in the table header.
    #[error("column '{column}' not found in {path}")]
    ColumnNotFound { column: String, path: PathBuf },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn open(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn parse(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/raw/Physical/BodySize.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /raw/Physical/BodySize.csv");

        let err = IngestError::DictionaryFormat {
            path: PathBuf::from("dict.csv"),
            found: 2,
            required: 4,
        };
        assert_eq!(
            err.to_string(),
            "dictionary dict.csv has 2 columns, at least 4 are required"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("eid".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }

    #[test]
    fn test_open_maps_not_found() {
        let err = IngestError::open(
            std::path::Path::new("missing.csv"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
