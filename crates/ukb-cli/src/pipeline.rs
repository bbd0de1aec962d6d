//! Field extraction pipeline with explicit stages.
//!
//! The run follows these stages in order:
//! 1. **Planning**: match the request against the dictionary
//! 2. Per planned table, in plan order:
//!    - **Resolving**: read the header, match identifiers, find the identifier column
//!    - **Extracting**: read the selected columns and apply output names
//!    - **Reconciling**: resolve duplicate and colliding column names
//!    - **Merging**: outer-join the extract into the accumulated table
//! 3. **Finalizing**: order the merged table and collect unmatched fields
//!
//! A failure inside a table's stages skips that table and the run moves on.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use polars::prelude::{Column, DataFrame};
use tracing::{debug, info, info_span, warn};

use ukb_ingest::{CompanionIdentifier, TableExtractor, TableProbe, locate_identifier_column};
use ukb_map::{
    ColumnResolver, PlannedQuery, QueryPlanner, QueryRequest, TableResolution,
    standardize_column_name,
};
use ukb_merge::{ConflictRenameMap, ConflictResolver, MergedTable};
use ukb_model::{DictionaryIndex, ExtractOptions, ExtractionPlan, PlannedTable, UnmatchedField};

use crate::report::{RunReport, Stage, TableFailure, TableOutcome, TableStatus};

// ============================================================================
// Stage 1: Planning
// ============================================================================

/// Plan the request; an empty request or a request matching nothing is fatal.
pub fn plan(
    index: &DictionaryIndex,
    options: &ExtractOptions,
    tokens: &[String],
) -> Result<PlannedQuery> {
    let request = QueryRequest::from_tokens(tokens);
    for identifier in request.identifiers.iter().filter(|id| !index.contains(id)) {
        warn!(identifier = %identifier, "identifier is not in the dictionary");
    }
    let planned = QueryPlanner::new(index, options)
        .plan(&request)
        .context("plan extraction")?;
    if !planned.has_matches() {
        bail!("no dictionary fields match the requested identifiers or names");
    }
    Ok(planned)
}

// ============================================================================
// Stage 2: Per-table processing
// ============================================================================

/// A table's extract, ready to merge.
struct PreparedExtract {
    frame: DataFrame,
    conflicts: ConflictRenameMap,
    /// Identifiers with at least one column in the extract.
    contributors: Vec<String>,
}

enum IdSource {
    /// Identifier column present in the table itself.
    Own(String),
    /// Row-aligned identifier values from a companion table.
    Companion(CompanionIdentifier),
}

struct TableRun<'a> {
    table: &'a PlannedTable,
    options: &'a ExtractOptions,
    extractor: TableExtractor<'a>,
    resolver: ColumnResolver<'a>,
    conflicts: &'a ConflictResolver,
}

impl TableRun<'_> {
    fn fail(&self, stage: Stage, message: impl std::fmt::Display) -> TableFailure {
        TableFailure::new(&self.table.table_path, stage, message)
    }

    /// Probe the file and match identifiers against its header. Known
    /// identifier columns are never offered to the resolver.
    fn resolve(&self) -> Result<(TableProbe, TableResolution), TableFailure> {
        let location = self.options.table_location(&self.table.table_path);
        let probe = self
            .extractor
            .probe(&location)
            .map_err(|e| self.fail(Stage::Resolving, e))?;
        let header: Vec<String> = probe
            .columns
            .iter()
            .filter(|column| !self.options.id_columns.contains(column))
            .cloned()
            .collect();
        let resolution = self
            .resolver
            .resolve_table(&header, &self.table.identifiers);
        Ok((probe, resolution))
    }

    /// Where the extract's identifier values come from.
    fn identifier_source(&self, probe: &TableProbe) -> Result<IdSource, TableFailure> {
        if let Some(column) = probe.id_column(&self.options.id_columns) {
            return Ok(IdSource::Own(column.to_string()));
        }
        locate_identifier_column(probe, &self.extractor)
            .map_err(|e| self.fail(Stage::Resolving, e))?
            .map(IdSource::Companion)
            .ok_or_else(|| {
                self.fail(
                    Stage::Resolving,
                    "no identifier column in the table or its companion directory",
                )
            })
    }

    /// Read the selected columns and give them their output names.
    fn extract(
        &self,
        probe: &TableProbe,
        resolution: &TableResolution,
    ) -> Result<(Vec<Column>, Vec<String>), TableFailure> {
        let id_source = self.identifier_source(probe)?;
        let selections = resolution.selections();
        let mut physical: Vec<String> = Vec::with_capacity(selections.len() + 1);
        if let IdSource::Own(column) = &id_source {
            physical.push(column.clone());
        }
        physical.extend(selections.iter().map(|(_, m)| m.physical_column.clone()));

        let frame = self
            .extractor
            .read_columns(probe, &physical)
            .map_err(|e| self.fail(Stage::Extracting, e))?;

        let id_values = match id_source {
            IdSource::Own(column) => frame
                .column(&column)
                .map_err(|e| self.fail(Stage::Extracting, e))?
                .clone(),
            IdSource::Companion(companion) => {
                if companion.values.len() != frame.height() {
                    return Err(self.fail(
                        Stage::Extracting,
                        format!(
                            "companion {} has {} rows, table has {}",
                            companion.source.display(),
                            companion.values.len(),
                            frame.height()
                        ),
                    ));
                }
                companion.values
            }
        };

        let mut columns = Vec::with_capacity(selections.len() + 1);
        columns.push(id_values.with_name(self.options.output_id_column.as_str().into()));
        for (_, selection) in &selections {
            let column = frame
                .column(&selection.physical_column)
                .map_err(|e| self.fail(Stage::Extracting, e))?
                .clone();
            let name = standardize_column_name(&selection.canonical_name)
                .unwrap_or_else(|| selection.canonical_name.clone());
            columns.push(column.with_name(name.as_str().into()));
        }

        if columns.len() < 2 {
            return Err(self.fail(Stage::Extracting, "no valid columns"));
        }
        // A column shared by several identifiers is read once but lands in
        // the output for all of them.
        let contributors = resolution
            .resolved_identifiers()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok((columns, contributors))
    }

    /// Resolve names within the extract, then against the merged table.
    fn reconcile(
        &self,
        columns: Vec<Column>,
        merged: &MergedTable,
    ) -> Result<(DataFrame, ConflictRenameMap), TableFailure> {
        let (mut columns, mut conflicts) = self.conflicts.resolve_intra_extract(columns);
        conflicts.extend(
            self.conflicts
                .resolve_against_merged(&mut columns, &merged.column_names()),
        );
        let frame = DataFrame::new(columns).map_err(|e| self.fail(Stage::Reconciling, e))?;
        Ok((frame, conflicts))
    }

    fn prepare(
        &self,
        merged: &MergedTable,
        resolution: &mut Option<TableResolution>,
    ) -> Result<PreparedExtract, TableFailure> {
        let (probe, resolved) = self.resolve()?;
        let resolved = resolution.insert(resolved);
        if resolved.is_empty() {
            return Err(self.fail(Stage::Resolving, "no requested field matches a column"));
        }
        let (columns, contributors) = self.extract(&probe, resolved)?;
        let (frame, conflicts) = self.reconcile(columns, merged)?;
        Ok(PreparedExtract {
            frame,
            conflicts,
            contributors,
        })
    }
}

/// Outcome of the extraction stages over every planned table.
#[derive(Debug)]
pub struct ExtractionRun {
    /// Merged table, identifier first, or `None` when nothing was merged.
    pub merged: Option<DataFrame>,
    pub report: RunReport,
}

/// Process every planned table in order and fold the extracts together.
pub fn extract_tables(
    plan: &ExtractionPlan,
    index: &DictionaryIndex,
    options: &ExtractOptions,
    progress: &ProgressBar,
) -> Result<ExtractionRun> {
    let extractor = TableExtractor::new(options);
    let resolver = ColumnResolver::new(index, options);
    let conflicts = ConflictResolver::new(options.output_id_column.as_str());
    let mut merged = MergedTable::new(options.output_id_column.as_str());
    let mut outcomes = Vec::with_capacity(plan.len());
    let mut contributed: HashSet<String> = HashSet::new();

    for (position, table) in plan.tables().iter().enumerate() {
        let span = info_span!("table", table = %table.table_path);
        let _guard = span.enter();
        let start = Instant::now();
        progress.set_message(table.table_path.clone());
        info!(
            table = %table.table_path,
            position = position + 1,
            total = plan.len(),
            identifiers = table.identifiers.len(),
            "processing table"
        );

        let run = TableRun {
            table,
            options,
            extractor,
            resolver,
            conflicts: &conflicts,
        };
        let mut resolution = None;
        let prepared = run.prepare(&merged, &mut resolution);
        let (resolved, unresolved) = resolution
            .map(|r| {
                let resolved: Vec<String> = r
                    .resolved_identifiers()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (resolved, r.unresolved)
            })
            .unwrap_or_default();

        let outcome = match prepared {
            Ok(extract) => {
                let rows = extract.frame.height();
                let columns = extract.frame.width().saturating_sub(1);
                if !extract.conflicts.is_empty() {
                    debug!(
                        renamed = ?extract.conflicts.renamed,
                        dropped = ?extract.conflicts.dropped,
                        "resolved column conflicts"
                    );
                }
                match merged.merge(extract.frame) {
                    Ok(step) => {
                        contributed.extend(extract.contributors);
                        info!(
                            table = %table.table_path,
                            rows,
                            columns,
                            merged_rows = step.rows(),
                            merged_columns = step.columns(),
                            duration_ms = start.elapsed().as_millis(),
                            "merged table"
                        );
                        TableOutcome {
                            table: table.table_path.clone(),
                            status: TableStatus::Merged,
                            resolved,
                            unresolved,
                            rows,
                            columns,
                            renamed: extract.conflicts.renamed.len(),
                            dropped: extract.conflicts.dropped.len(),
                        }
                    }
                    Err(error) => {
                        let failure = run.fail(Stage::Merging, error);
                        warn!(stage = %failure.stage, error = %failure.message, "skipping table");
                        TableOutcome::skipped(failure, resolved, unresolved)
                    }
                }
            }
            Err(failure) => {
                warn!(stage = %failure.stage, error = %failure.message, "skipping table");
                TableOutcome::skipped(failure, resolved, unresolved)
            }
        };
        outcomes.push(outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    // ========================================================================
    // Stage 3: Finalizing
    // ========================================================================
    let merged = merged.finish().context("finalize merged table")?;
    let unmatched = unmatched_fields(plan, index, &contributed);
    for field in &unmatched {
        warn!(identifier = %field.identifier, field = %field.display_name, "no column found for field");
    }
    let (merged_rows, merged_columns) = merged
        .as_ref()
        .map_or((0, 0), |df| (df.height(), df.width()));
    debug!(merged_rows, merged_columns, unmatched = unmatched.len(), "extraction finished");

    Ok(ExtractionRun {
        merged,
        report: RunReport {
            plan: plan.clone(),
            outcomes,
            merged_rows,
            merged_columns,
            unmatched,
        },
    })
}

/// Planned fields known to the dictionary that never reached the output.
pub fn unmatched_fields(
    plan: &ExtractionPlan,
    index: &DictionaryIndex,
    contributed: &HashSet<String>,
) -> Vec<UnmatchedField> {
    plan.identifiers()
        .into_iter()
        .filter(|identifier| !contributed.contains(*identifier))
        .filter_map(|identifier| {
            index.display_name(identifier).map(|name| UnmatchedField {
                identifier: identifier.to_string(),
                display_name: name.to_string(),
            })
        })
        .collect()
}
