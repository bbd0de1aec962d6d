//! Field dictionary loading.
//!
//! The dictionary is read positionally: column 0 holds the hierarchical
//! table path, column 2 the field identifier and column 3 the display name.
//! Header names are not inspected.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use ukb_model::{DictionaryIndex, FieldDescriptor};

use crate::error::{IngestError, Result};

/// Narrowest dictionary the positional layout can address.
pub const DICTIONARY_MIN_COLUMNS: usize = 4;

const PATH_COLUMN: usize = 0;
const IDENTIFIER_COLUMN: usize = 2;
const NAME_COLUMN: usize = 3;

/// Loads the dictionary into a read-only index.
///
/// Fails when the file cannot be read, has no header row, or its header is
/// narrower than [`DICTIONARY_MIN_COLUMNS`]. Data rows that are too short
/// are skipped.
pub fn load_dictionary(path: &Path) -> Result<DictionaryIndex> {
    let start = Instant::now();
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| IngestError::parse(path, e))?,
        None => {
            return Err(IngestError::EmptyDictionary {
                path: path.to_path_buf(),
            });
        }
    };
    if header.len() < DICTIONARY_MIN_COLUMNS {
        return Err(IngestError::DictionaryFormat {
            path: path.to_path_buf(),
            found: header.len(),
            required: DICTIONARY_MIN_COLUMNS,
        });
    }

    let mut fields = Vec::new();
    let mut skipped = 0usize;
    for record in records {
        let record = record.map_err(|e| IngestError::parse(path, e))?;
        match descriptor_from_record(&record) {
            Some(field) => fields.push(field),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped short dictionary rows");
    }
    info!(
        path = %path.display(),
        fields = fields.len(),
        duration_ms = start.elapsed().as_millis(),
        "loaded field dictionary"
    );
    Ok(DictionaryIndex::new(fields))
}

fn descriptor_from_record(record: &StringRecord) -> Option<FieldDescriptor> {
    if record.len() < DICTIONARY_MIN_COLUMNS {
        return None;
    }
    let cell = |index: usize| record.get(index).map(str::trim).unwrap_or_default();
    Some(FieldDescriptor::new(
        cell(IDENTIFIER_COLUMN),
        cell(NAME_COLUMN),
        cell(PATH_COLUMN),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_positional_columns() {
        let file = create_temp_csv(
            "Path,Category,FieldID,Field,Units\n\
             Physical > BodySize,100,21, Height ,cm\n\
             Physical > BodySize,100,50,Weight,kg\n",
        );
        let index = load_dictionary(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.display_name("21"), Some("Height"));
        assert_eq!(index.fields()[1].table_path, "Physical > BodySize");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let file = create_temp_csv("Path,Category,FieldID,Field\nA,1,21\nA,1,22,Weight\n");
        let index = load_dictionary(file.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(!index.contains("21"));
        assert!(index.contains("22"));
    }

    #[test]
    fn test_empty_path_rows_are_kept() {
        let file = create_temp_csv("Path,Category,FieldID,Field\n,1,21,Height\n");
        let index = load_dictionary(file.path()).unwrap();
        assert_eq!(index.fields()[0].table_path, "");
    }

    #[test]
    fn test_narrow_header_is_rejected() {
        let file = create_temp_csv("Path,FieldID,Field\nA,21,Height\n");
        let result = load_dictionary(file.path());
        assert!(matches!(
            result,
            Err(IngestError::DictionaryFormat {
                found: 3,
                required: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = create_temp_csv("");
        let result = load_dictionary(file.path());
        assert!(matches!(result, Err(IngestError::EmptyDictionary { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_dictionary(Path::new("/nonexistent/dictionary.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
