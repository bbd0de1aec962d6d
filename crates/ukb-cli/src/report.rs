//! Per-table outcomes and the run report.

use std::fmt;

use serde::Serialize;

use ukb_model::{ExtractionPlan, UnmatchedField};

/// Per-table pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Resolving,
    Extracting,
    Reconciling,
    Merging,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Extracting => "extracting",
            Self::Reconciling => "reconciling",
            Self::Merging => "merging",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a planned table contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFailure {
    pub table: String,
    pub stage: Stage,
    pub message: String,
}

impl TableFailure {
    pub fn new(table: &str, stage: Stage, message: impl fmt::Display) -> Self {
        Self {
            table: table.to_string(),
            stage,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for TableFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.table, self.stage, self.message)
    }
}

/// Whether a table reached the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Merged,
    Skipped { failure: TableFailure },
}

/// What happened to one planned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutcome {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
    /// Identifiers with at least one matching column.
    pub resolved: Vec<String>,
    /// Identifiers with no matching column in this table.
    pub unresolved: Vec<String>,
    /// Rows in the extract.
    pub rows: usize,
    /// Data columns in the extract, identifier excluded.
    pub columns: usize,
    /// Columns renamed to avoid name conflicts.
    pub renamed: usize,
    /// Columns dropped as content duplicates.
    pub dropped: usize,
}

impl TableOutcome {
    pub fn skipped(failure: TableFailure, resolved: Vec<String>, unresolved: Vec<String>) -> Self {
        Self {
            table: failure.table.clone(),
            status: TableStatus::Skipped { failure },
            resolved,
            unresolved,
            rows: 0,
            columns: 0,
            renamed: 0,
            dropped: 0,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self.status, TableStatus::Merged)
    }

    pub fn failure(&self) -> Option<&TableFailure> {
        match &self.status {
            TableStatus::Merged => None,
            TableStatus::Skipped { failure } => Some(failure),
        }
    }
}

/// Everything a run did, serialized next to the outputs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub plan: ExtractionPlan,
    pub outcomes: Vec<TableOutcome>,
    pub merged_rows: usize,
    pub merged_columns: usize,
    pub unmatched: Vec<UnmatchedField>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &TableFailure> {
        self.outcomes.iter().filter_map(TableOutcome::failure)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn merged_tables(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_merged()).count()
    }
}
