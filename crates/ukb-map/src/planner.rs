//! Extraction planning from the dictionary and a request.

use tracing::{info, warn};

use ukb_model::{DictionaryIndex, ExtractOptions, ExtractionPlan, MappingRecord, table_file_path};

use crate::error::{PlanError, Result};
use crate::tokens::QueryRequest;

/// Output of planning: the per-table plan and one mapping record per
/// matching dictionary row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedQuery {
    pub plan: ExtractionPlan,
    pub mapping: Vec<MappingRecord>,
}

impl PlannedQuery {
    /// False when no dictionary row matched the request.
    pub fn has_matches(&self) -> bool {
        !self.plan.is_empty()
    }
}

/// Builds extraction plans against a read-only dictionary.
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner<'a> {
    index: &'a DictionaryIndex,
    options: &'a ExtractOptions,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(index: &'a DictionaryIndex, options: &'a ExtractOptions) -> Self {
        Self { index, options }
    }

    /// Walk the dictionary in order and collect every row whose identifier
    /// or display name was requested.
    ///
    /// Rows with an empty table path are skipped with a warning. An empty
    /// plan is not an error; callers check [`PlannedQuery::has_matches`].
    pub fn plan(&self, request: &QueryRequest) -> Result<PlannedQuery> {
        if request.is_empty() {
            return Err(PlanError::NoValidTokens);
        }

        let mut planned = PlannedQuery::default();
        for (row, field) in self.index.fields().iter().enumerate() {
            if !request.wants(&field.identifier, &field.display_name) {
                continue;
            }
            let path = field.table_path.trim();
            if path.is_empty() {
                warn!(row = row + 1, identifier = %field.identifier, "dictionary row has an empty table path");
                continue;
            }
            let file_path = table_file_path(
                path,
                &self.options.path_separator,
                &self.options.table_extension,
            );
            planned.plan.add(&file_path, &field.identifier);
            planned.mapping.push(MappingRecord {
                path: path.to_string(),
                file_path,
                field_id: field.identifier.clone(),
                field: field.display_name.clone(),
            });
        }

        if planned.has_matches() {
            info!(
                matches = planned.mapping.len(),
                tables = planned.plan.len(),
                "planned extraction"
            );
        } else {
            warn!(
                identifiers = request.identifiers.len(),
                names = request.names.len(),
                "no dictionary rows match the request"
            );
        }
        Ok(planned)
    }
}
