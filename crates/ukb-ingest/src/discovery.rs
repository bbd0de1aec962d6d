//! Table file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists table files under a directory, recursively.
///
/// The extension match is case-insensitive. Results are sorted by full path
/// so that callers scanning for a first match get a reproducible order.
pub fn list_table_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut files = Vec::new();
    collect_files(dir, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(&path, extension, files)?;
            continue;
        }

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

        if matches && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
