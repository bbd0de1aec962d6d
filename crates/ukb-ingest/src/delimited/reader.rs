//! Column-selective table reads. Every selected column is read as text.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use polars::prelude::{
    Column, CsvParseOptions, CsvReadOptions, DataFrame, IntoColumn, NamedFrom, PlSmallStr,
    SerReader, Series,
};

use crate::error::{IngestError, Result};

/// Reads the selected columns of a table in one pass with Polars.
///
/// Schema inference is disabled so every column comes back as a string
/// column and values are kept exactly as written. Columns are returned in
/// the order of `columns`.
pub(crate) fn read_frame(path: &Path, delimiter: u8, columns: &[String]) -> Result<DataFrame> {
    let selected: Arc<[PlSmallStr]> = columns
        .iter()
        .map(|name| PlSmallStr::from(name.as_str()))
        .collect();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_columns(Some(selected))
        .with_parse_options(CsvParseOptions::default().with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::parse(path, e))?
        .finish()
        .map_err(|e| IngestError::parse(path, e))?;

    Ok(df.select(columns.iter().map(String::as_str))?)
}

/// Reads the selected columns in fixed-size row chunks and concatenates them.
///
/// Only one chunk of raw values is buffered at a time. Empty cells become
/// nulls, matching the single-pass reader.
pub(crate) fn read_frame_chunked(
    path: &Path,
    delimiter: u8,
    columns: &[String],
    chunk_rows: usize,
) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::parse(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut positions = Vec::with_capacity(columns.len());
    for column in columns {
        let position = headers.iter().position(|h| h == column).ok_or_else(|| {
            IngestError::ColumnNotFound {
                column: column.clone(),
                path: path.to_path_buf(),
            }
        })?;
        positions.push(position);
    }

    let chunk_rows = chunk_rows.max(1);
    let mut buffers: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(chunk_rows); columns.len()];
    let mut combined: Option<DataFrame> = None;
    let mut buffered = 0usize;
    let mut chunk_count = 0usize;
    let mut record = StringRecord::new();

    while reader
        .read_record(&mut record)
        .map_err(|e| IngestError::parse(path, e))?
    {
        for (buffer, &position) in buffers.iter_mut().zip(&positions) {
            let value = record.get(position).filter(|value| !value.is_empty());
            buffer.push(value.map(str::to_string));
        }
        buffered += 1;
        if buffered == chunk_rows {
            append_chunk(&mut combined, chunk_frame(columns, &mut buffers)?)?;
            buffered = 0;
            chunk_count += 1;
            if chunk_count % 5 == 0 {
                tracing::debug!(path = %path.display(), chunk_count, "reading chunks");
            }
        }
    }
    if buffered > 0 || combined.is_none() {
        append_chunk(&mut combined, chunk_frame(columns, &mut buffers)?)?;
        chunk_count += 1;
    }
    tracing::debug!(path = %path.display(), chunk_count, "chunked read complete");

    combined.ok_or_else(|| IngestError::EmptyTable {
        path: path.to_path_buf(),
    })
}

fn chunk_frame(columns: &[String], buffers: &mut [Vec<Option<String>>]) -> Result<DataFrame> {
    let cols: Vec<Column> = columns
        .iter()
        .zip(buffers.iter_mut())
        .map(|(name, values)| {
            Series::new(name.as_str().into(), std::mem::take(values)).into_column()
        })
        .collect();
    Ok(DataFrame::new(cols)?)
}

fn append_chunk(combined: &mut Option<DataFrame>, chunk: DataFrame) -> Result<()> {
    match combined.as_mut() {
        Some(existing) => {
            existing.vstack_mut(&chunk)?;
        }
        None => *combined = Some(chunk),
    }
    Ok(())
}
