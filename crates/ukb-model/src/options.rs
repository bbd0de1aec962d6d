//! Run configuration.
//!
//! Every field has a default, so a partial TOML file only overrides the keys
//! it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Tables above this size are read in row chunks.
pub const DEFAULT_CHUNK_THRESHOLD_BYTES: u64 = 100 * 1024 * 1024;
/// Rows per chunk for chunked reads.
pub const DEFAULT_CHUNK_ROWS: usize = 50_000;
pub const DEFAULT_DICTIONARY_FILE: &str = "Data_Dictionary_Showcase.csv";
pub const DEFAULT_OUTPUT_ID_COLUMN: &str = "participant.eid";

/// Options controlling planning and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractOptions {
    /// Directory that table paths are relative to.
    pub data_root: PathBuf,
    /// Dictionary file, relative to `data_root` unless absolute.
    pub dictionary_file: PathBuf,
    /// File size above which tables are read in chunks.
    pub chunk_threshold_bytes: u64,
    /// Rows per chunk.
    pub chunk_rows: usize,
    /// Lines sampled for delimiter detection.
    pub header_sample_rows: usize,
    /// Candidate delimiters, tried in order.
    pub delimiters: Vec<char>,
    /// Known subject identifier column names, in priority order.
    pub id_columns: Vec<String>,
    /// Name of the identifier column in the merged output.
    pub output_id_column: String,
    /// Prefix of field columns in table headers.
    pub column_prefix: String,
    /// Separator between segments of a dictionary table path.
    pub path_separator: String,
    /// Extension of table files, without the dot.
    pub table_extension: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            dictionary_file: PathBuf::from(DEFAULT_DICTIONARY_FILE),
            chunk_threshold_bytes: DEFAULT_CHUNK_THRESHOLD_BYTES,
            chunk_rows: DEFAULT_CHUNK_ROWS,
            header_sample_rows: 5,
            delimiters: vec![',', '\t', ';', '|', ' '],
            id_columns: vec![DEFAULT_OUTPUT_ID_COLUMN.to_string(), "eid".to_string()],
            output_id_column: DEFAULT_OUTPUT_ID_COLUMN.to_string(),
            column_prefix: "participant.p".to_string(),
            path_separator: " > ".to_string(),
            table_extension: "csv".to_string(),
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    #[must_use]
    pub fn with_dictionary_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_file = path.into();
        self
    }

    #[must_use]
    pub fn with_chunk_threshold_bytes(mut self, bytes: u64) -> Self {
        self.chunk_threshold_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows;
        self
    }

    /// Absolute or root-relative location of the dictionary file.
    pub fn dictionary_path(&self) -> PathBuf {
        self.resolve(&self.dictionary_file)
    }

    /// Location of a table given its relative file path.
    pub fn table_location(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.resolve(relative.as_ref())
    }

    /// Delimiters as single bytes, in configured order.
    pub fn delimiter_bytes(&self) -> Vec<u8> {
        self.delimiters
            .iter()
            .filter_map(|&ch| u8::try_from(ch).ok())
            .collect()
    }

    /// Check invariants that the extractor relies on.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_rows == 0 {
            return Err(ModelError::InvalidOption {
                option: "chunk_rows",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.header_sample_rows == 0 {
            return Err(ModelError::InvalidOption {
                option: "header_sample_rows",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(ch) = self.delimiters.iter().find(|ch| !ch.is_ascii()) {
            return Err(ModelError::InvalidOption {
                option: "delimiters",
                reason: format!("'{ch}' is not a single-byte character"),
            });
        }
        if self.delimiters.is_empty() {
            return Err(ModelError::InvalidOption {
                option: "delimiters",
                reason: "at least one delimiter is required".to_string(),
            });
        }
        if self.id_columns.is_empty() {
            return Err(ModelError::InvalidOption {
                option: "id_columns",
                reason: "at least one identifier column name is required".to_string(),
            });
        }
        if self.output_id_column.trim().is_empty() {
            return Err(ModelError::InvalidOption {
                option: "output_id_column",
                reason: "must not be empty".to_string(),
            });
        }
        if self.path_separator.is_empty() {
            return Err(ModelError::InvalidOption {
                option: "path_separator",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_root.join(path)
        }
    }
}
