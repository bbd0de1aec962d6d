//! Incremental outer-join merge.

use polars::prelude::{
    DataFrame, DataType, IntoLazy, JoinArgs, JoinCoalesce, JoinType, SortMultipleOptions, col,
};
use tracing::{debug, info};

use crate::error::{MergeError, Result};

/// What a successful merge step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// First extract became the accumulated table.
    Initialized { rows: usize, columns: usize },
    /// Extract was outer-joined into the accumulated table.
    Joined { rows: usize, columns: usize },
}

impl MergeStep {
    pub fn rows(&self) -> usize {
        match self {
            Self::Initialized { rows, .. } | Self::Joined { rows, .. } => *rows,
        }
    }

    pub fn columns(&self) -> usize {
        match self {
            Self::Initialized { columns, .. } | Self::Joined { columns, .. } => *columns,
        }
    }
}

/// The accumulated wide table, keyed by the identifier column.
///
/// Starts empty. Each [`merge`](Self::merge) either replaces the table with
/// the joined result or fails and leaves it untouched.
#[derive(Debug, Clone)]
pub struct MergedTable {
    frame: Option<DataFrame>,
    id_column: String,
}

impl MergedTable {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            frame: None,
            id_column: id_column.into(),
        }
    }

    pub fn height(&self) -> usize {
        self.frame.as_ref().map_or(0, DataFrame::height)
    }

    /// Column names currently in the table.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .into_iter()
                    .map(|name| name.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_extract(&self, extract: &DataFrame) -> Result<()> {
        if extract.column(&self.id_column).is_err() {
            return Err(MergeError::MissingIdColumn {
                column: self.id_column.clone(),
            });
        }
        if extract.width() < 2 {
            return Err(MergeError::NoDataColumns {
                column: self.id_column.clone(),
            });
        }
        if let Some(current) = &self.frame {
            let collision = extract
                .get_column_names()
                .into_iter()
                .find(|name| name.as_str() != self.id_column && current.column(name).is_ok());
            if let Some(name) = collision {
                return Err(MergeError::DuplicateColumn {
                    column: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fold one conflict-free extract into the table.
    pub fn merge(&mut self, extract: DataFrame) -> Result<MergeStep> {
        self.check_extract(&extract)?;

        let Some(current) = &self.frame else {
            let step = MergeStep::Initialized {
                rows: extract.height(),
                columns: extract.width(),
            };
            debug!(rows = step.rows(), columns = step.columns(), "initialized merged table");
            self.frame = Some(extract);
            return Ok(step);
        };

        let key = [col(self.id_column.as_str())];
        let joined = current
            .clone()
            .lazy()
            .join(
                extract.lazy(),
                key.clone(),
                key,
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;

        let step = MergeStep::Joined {
            rows: joined.height(),
            columns: joined.width(),
        };
        debug!(rows = step.rows(), columns = step.columns(), "joined extract into merged table");
        self.frame = Some(joined);
        Ok(step)
    }

    /// Final table: rows ordered by identifier, identifier column first.
    ///
    /// Identifiers are ordered numerically; identifiers that are not integers
    /// follow in text order.
    ///
    /// Returns `None` when nothing was merged.
    pub fn finish(self) -> Result<Option<DataFrame>> {
        let Some(frame) = self.frame else {
            return Ok(None);
        };
        let mut order = vec![col(self.id_column.as_str())];
        order.extend(
            frame
                .get_column_names()
                .into_iter()
                .filter(|name| name.as_str() != self.id_column)
                .map(|name| col(name.clone())),
        );
        let id = col(self.id_column.as_str());
        let finished = frame
            .lazy()
            .sort_by_exprs(
                [id.clone().cast(DataType::Int64), id],
                SortMultipleOptions::default()
                    .with_maintain_order(true)
                    .with_nulls_last(true),
            )
            .select(order)
            .collect()?;
        info!(
            rows = finished.height(),
            columns = finished.width(),
            "finalized merged table"
        );
        Ok(Some(finished))
    }
}
