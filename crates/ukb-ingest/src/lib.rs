//! Table ingestion for field extraction.
//!
//! This crate reads the field dictionary and the physical tables it points
//! at. Tables are plain delimited text files whose delimiter is not known in
//! advance; every cell is read as text.
//!
//! # Features
//!
//! - **Dictionary loading**: positional columns (path, -, identifier, name)
//! - **Delimiter detection**: first candidate that splits the header sample
//! - **Extraction**: whole-table or chunked reads of selected columns only
//! - **Identifier location**: companion folder search for a row-aligned
//!   identifier column when a table lacks one
//!
//! # Example
//!
//! ```ignore
//! use ukb_ingest::{TableExtractor, load_dictionary};
//! use ukb_model::ExtractOptions;
//!
//! let options = ExtractOptions::default().with_data_root("/data/raw");
//! let index = load_dictionary(&options.dictionary_path())?;
//! let extractor = TableExtractor::new(&options);
//! let probe = extractor.probe(&options.table_location("Physical/BodySize.csv"))?;
//! let frame = extractor.read_columns(&probe, &probe.columns[..2])?;
//! ```

mod delimited;
mod dictionary;
mod discovery;
mod error;
mod extract;
mod locator;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use delimited::{count_rows, detect_delimiter, read_header};

// === Dictionary ===
pub use dictionary::{DICTIONARY_MIN_COLUMNS, load_dictionary};

// === File Discovery ===
pub use discovery::list_table_files;

// === Extraction ===
pub use extract::{ReadStrategy, TableExtractor, TableProbe};
pub use locator::{CompanionIdentifier, companion_directory, locate_identifier_column};
