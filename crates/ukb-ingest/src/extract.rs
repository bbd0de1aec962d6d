//! Table probing and column extraction.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::debug;

use ukb_model::ExtractOptions;

use crate::delimited::{detect_delimiter, read_frame, read_frame_chunked, read_header};
use crate::error::{IngestError, Result};

/// How a table is read, decided by file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Read the whole table in one pass.
    Whole,
    /// Read fixed-size row chunks and concatenate.
    Chunked { rows: usize },
}

impl ReadStrategy {
    /// Chunked above the configured threshold, whole otherwise.
    pub fn for_size(size_bytes: u64, options: &ExtractOptions) -> Self {
        if size_bytes > options.chunk_threshold_bytes {
            Self::Chunked {
                rows: options.chunk_rows,
            }
        } else {
            Self::Whole
        }
    }
}

/// Header-level facts about a table, gathered before any data is read.
#[derive(Debug, Clone)]
pub struct TableProbe {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub delimiter: u8,
    pub columns: Vec<String>,
}

impl TableProbe {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// First known identifier column present in the header, in priority order.
    pub fn id_column<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .find(|candidate| self.has_column(candidate))
            .map(String::as_str)
    }
}

/// Reads tables according to the run options.
#[derive(Debug, Clone, Copy)]
pub struct TableExtractor<'a> {
    options: &'a ExtractOptions,
}

impl<'a> TableExtractor<'a> {
    pub fn new(options: &'a ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &'a ExtractOptions {
        self.options
    }

    /// Stat the file, detect its delimiter and read its header.
    pub fn probe(&self, path: &Path) -> Result<TableProbe> {
        let metadata = std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;
        if !metadata.is_file() {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let delimiter = detect_delimiter(
            path,
            &self.options.delimiter_bytes(),
            self.options.header_sample_rows,
        )?;
        let columns = read_header(path, delimiter)?;
        Ok(TableProbe {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            delimiter,
            columns,
        })
    }

    pub fn strategy(&self, probe: &TableProbe) -> ReadStrategy {
        ReadStrategy::for_size(probe.size_bytes, self.options)
    }

    /// Materialize only the named columns, in the given order.
    pub fn read_columns(&self, probe: &TableProbe, columns: &[String]) -> Result<DataFrame> {
        if let Some(missing) = columns.iter().find(|column| !probe.has_column(column)) {
            return Err(IngestError::ColumnNotFound {
                column: missing.clone(),
                path: probe.path.clone(),
            });
        }
        let start = Instant::now();
        let strategy = self.strategy(probe);
        let df = match strategy {
            ReadStrategy::Whole => read_frame(&probe.path, probe.delimiter, columns)?,
            ReadStrategy::Chunked { rows } => {
                read_frame_chunked(&probe.path, probe.delimiter, columns, rows)?
            }
        };
        debug!(
            path = %probe.path.display(),
            strategy = ?strategy,
            size_bytes = probe.size_bytes,
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "read table columns"
        );
        Ok(df)
    }
}
