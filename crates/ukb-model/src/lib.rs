//! Shared data model for field extraction.
//!
//! Types here are produced once per run (dictionary, plan) or once per table
//! (column matches) and carry no I/O of their own.

pub mod dictionary;
pub mod error;
pub mod matching;
pub mod options;
pub mod plan;
pub mod report;

pub use dictionary::{DictionaryIndex, FieldDescriptor};
pub use error::{ModelError, Result};
pub use matching::{ColumnMatch, MatchStrategy};
pub use options::ExtractOptions;
pub use plan::{ExtractionPlan, PlannedTable, table_file_path};
pub use report::{MappingRecord, UnmatchedField};
