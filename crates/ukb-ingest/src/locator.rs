//! Companion identifier lookup for tables without an identifier column.
//!
//! A table `dir/Name.csv` may keep its identifiers in any table under
//! `dir/Name/`. Candidates are matched by row count only; row order is
//! assumed to be aligned with the target table.

use std::path::{Path, PathBuf};

use polars::prelude::Column;
use tracing::{debug, info};

use crate::delimited::count_rows;
use crate::discovery::list_table_files;
use crate::error::Result;
use crate::extract::{TableExtractor, TableProbe};

/// Identifier values borrowed from a companion table.
#[derive(Debug, Clone)]
pub struct CompanionIdentifier {
    /// Companion table the values were read from.
    pub source: PathBuf,
    /// Identifier column name in the companion table.
    pub column: String,
    /// Identifier values, one per row of the target table.
    pub values: Column,
}

/// Directory searched for companions: the table's own directory joined
/// with its file stem.
pub fn companion_directory(table: &Path) -> PathBuf {
    let stem = table.file_stem().unwrap_or_default();
    match table.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Finds the first companion table that has an identifier column and the
/// same number of data rows as `probe`.
///
/// Companions are visited in lexicographic path order. Returns `Ok(None)`
/// when the companion directory is missing or no candidate qualifies;
/// unreadable candidates are skipped.
pub fn locate_identifier_column(
    probe: &TableProbe,
    extractor: &TableExtractor<'_>,
) -> Result<Option<CompanionIdentifier>> {
    let options = extractor.options();
    let directory = companion_directory(&probe.path);
    if !directory.is_dir() {
        debug!(
            table = %probe.path.display(),
            directory = %directory.display(),
            "no companion directory"
        );
        return Ok(None);
    }

    let target_rows = count_rows(&probe.path, probe.delimiter)?;
    let candidates = list_table_files(&directory, &options.table_extension)?;

    for candidate in candidates {
        if candidate == probe.path {
            continue;
        }
        let candidate_probe = match extractor.probe(&candidate) {
            Ok(candidate_probe) => candidate_probe,
            Err(error) => {
                debug!(candidate = %candidate.display(), %error, "skipping unreadable companion");
                continue;
            }
        };
        let Some(id_column) = candidate_probe.id_column(&options.id_columns) else {
            continue;
        };
        let rows = match count_rows(&candidate, candidate_probe.delimiter) {
            Ok(rows) => rows,
            Err(error) => {
                debug!(candidate = %candidate.display(), %error, "skipping unreadable companion");
                continue;
            }
        };
        if rows != target_rows {
            debug!(
                candidate = %candidate.display(),
                rows,
                target_rows,
                "companion row count differs"
            );
            continue;
        }

        let column = id_column.to_string();
        let values = match extractor
            .read_columns(&candidate_probe, std::slice::from_ref(&column))
            .and_then(|mut frame| Ok(frame.drop_in_place(&column)?))
        {
            Ok(values) => values,
            Err(error) => {
                debug!(candidate = %candidate.display(), %error, "skipping unreadable companion");
                continue;
            }
        };
        info!(
            table = %probe.path.display(),
            companion = %candidate.display(),
            column = %column,
            rows,
            "using companion identifier column"
        );
        return Ok(Some(CompanionIdentifier {
            source: candidate,
            column,
            values,
        }));
    }

    Ok(None)
}
