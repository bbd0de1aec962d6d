//! Delimiter detection and header inspection.

use std::fs::File;
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder};

use crate::error::{IngestError, Result};

fn open_reader(path: &Path, delimiter: u8) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(file))
}

/// Normalizes a header value by removing a leading byte-order mark.
fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').to_string()
}

/// Picks the first candidate delimiter that splits the header into more
/// than one column and parses the first `sample_rows` records cleanly.
pub fn detect_delimiter(path: &Path, candidates: &[u8], sample_rows: usize) -> Result<u8> {
    for (position, &delimiter) in candidates.iter().enumerate() {
        let mut reader = open_reader(path, delimiter)?;
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(_) => continue,
        };
        if position == 0 && headers.iter().all(|h| normalize_header(h).trim().is_empty()) {
            return Err(IngestError::EmptyTable {
                path: path.to_path_buf(),
            });
        }
        if headers.len() <= 1 {
            continue;
        }
        let mut record = ByteRecord::new();
        let mut clean = true;
        for _ in 0..sample_rows {
            match reader.read_byte_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(_) => {
                    clean = false;
                    break;
                }
            }
        }
        if clean {
            tracing::debug!(
                path = %path.display(),
                delimiter = %char::from(delimiter).escape_default(),
                columns = headers.len(),
                "detected delimiter"
            );
            return Ok(delimiter);
        }
    }
    Err(IngestError::DelimiterNotDetected {
        path: path.to_path_buf(),
    })
}

/// Reads the header row with a known delimiter.
pub fn read_header(path: &Path, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = open_reader(path, delimiter)?;
    let headers = reader
        .headers()
        .map_err(|e| IngestError::parse(path, e))?;
    Ok(headers.iter().map(normalize_header).collect())
}

/// Counts data records (excluding the header).
pub fn count_rows(path: &Path, delimiter: u8) -> Result<usize> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let mut record = ByteRecord::new();
    let mut rows = 0usize;
    while reader
        .read_byte_record(&mut record)
        .map_err(|e| IngestError::parse(path, e))?
    {
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b' '];

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_detect_comma() {
        let file = create_temp_csv("eid,p21_i0\n1,170\n");
        assert_eq!(detect_delimiter(file.path(), &CANDIDATES, 5).unwrap(), b',');
    }

    #[test]
    fn test_detect_tab_before_space() {
        let file = create_temp_csv("eid\tHeight | Instance 0\n1\t170\n");
        assert_eq!(detect_delimiter(file.path(), &CANDIDATES, 5).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_pipe() {
        let file = create_temp_csv("eid|p21_i0|p21_i1\n1|170|171\n");
        assert_eq!(detect_delimiter(file.path(), &CANDIDATES, 5).unwrap(), b'|');
    }

    #[test]
    fn test_single_column_is_not_detected() {
        let file = create_temp_csv("eid\n1\n2\n");
        let result = detect_delimiter(file.path(), &CANDIDATES, 5);
        assert!(matches!(result, Err(IngestError::DelimiterNotDetected { .. })));
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv("");
        let result = detect_delimiter(file.path(), &CANDIDATES, 5);
        assert!(matches!(result, Err(IngestError::EmptyTable { .. })));
    }

    #[test]
    fn test_ragged_sample_rejects_candidate() {
        // Comma splits the header but the sample rows disagree on width;
        // semicolon is consistent.
        let file = create_temp_csv("a,b;c\n1;2,3,4\n5;6\n");
        assert_eq!(detect_delimiter(file.path(), &CANDIDATES, 5).unwrap(), b';');
    }

    #[test]
    fn test_read_header_strips_bom() {
        let file = create_temp_csv("\u{feff}eid,p21_i0\n1,170\n");
        let header = read_header(file.path(), b',').unwrap();
        assert_eq!(header, vec!["eid", "p21_i0"]);
    }

    #[test]
    fn test_count_rows_handles_quoted_newlines() {
        let file = create_temp_csv("eid,note\n1,\"two\nlines\"\n2,plain\n");
        assert_eq!(count_rows(file.path(), b',').unwrap(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = read_header(Path::new("/nonexistent/table.csv"), b',');
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
