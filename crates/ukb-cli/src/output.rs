//! Output writers: mapping table, merged table, unmatched fields, run report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use ukb_model::{MappingRecord, UnmatchedField};

use crate::report::RunReport;

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Write the field mapping table (`path,file_path,fieldid,field`).
///
/// Nothing is written for an empty mapping; returns whether a file was written.
pub fn write_mapping(path: &Path, records: &[MappingRecord]) -> Result<bool> {
    if records.is_empty() {
        return Ok(false);
    }
    write_records(path, records)?;
    info!(path = %path.display(), records = records.len(), "wrote field mapping");
    Ok(true)
}

/// Write the unmatched field list (`fieldid,field`). Nothing is written when
/// every field matched.
pub fn write_unmatched(path: &Path, fields: &[UnmatchedField]) -> Result<bool> {
    if fields.is_empty() {
        return Ok(false);
    }
    write_records(path, fields)?;
    info!(path = %path.display(), fields = fields.len(), "wrote unmatched fields");
    Ok(true)
}

/// Write the merged table as comma-separated text with a header row.
pub fn write_merged(path: &Path, frame: &mut DataFrame) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    CsvWriter::new(&mut writer)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "wrote merged table"
    );
    Ok(())
}

/// Write the run report as pretty JSON.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
