//! Extraction plan: which identifiers to pull from which table file.

use serde::Serialize;

/// Convert a hierarchical dictionary path into a relative table file path.
///
/// `"Physical > BodySize"` with separator `" > "` and extension `"csv"`
/// becomes `"Physical/BodySize.csv"`.
pub fn table_file_path(hierarchical: &str, separator: &str, extension: &str) -> String {
    let mut path = hierarchical.trim().replace(separator, "/");
    if !extension.is_empty() {
        path.push('.');
        path.push_str(extension);
    }
    path
}

/// Identifiers requested from one table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTable {
    /// Relative table file path (e.g. "Physical/BodySize.csv").
    pub table_path: String,
    /// Requested identifiers, duplicate-free, in insertion order. Never empty.
    pub identifiers: Vec<String>,
}

/// Ordered mapping from table file path to requested identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionPlan {
    tables: Vec<PlannedTable>,
}

impl ExtractionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier to a table, creating the table entry on first use.
    ///
    /// Duplicate identifiers for the same table are ignored.
    pub fn add(&mut self, table_path: &str, identifier: &str) {
        match self
            .tables
            .iter_mut()
            .find(|table| table.table_path == table_path)
        {
            Some(table) => {
                if !table.identifiers.iter().any(|id| id == identifier) {
                    table.identifiers.push(identifier.to_string());
                }
            }
            None => self.tables.push(PlannedTable {
                table_path: table_path.to_string(),
                identifiers: vec![identifier.to_string()],
            }),
        }
    }

    pub fn tables(&self) -> &[PlannedTable] {
        &self.tables
    }

    pub fn get(&self, table_path: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|table| table.table_path == table_path)
            .map(|table| table.identifiers.as_slice())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every planned identifier once, in first-seen order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for table in &self.tables {
            for identifier in &table.identifiers {
                if !seen.contains(&identifier.as_str()) {
                    seen.push(identifier);
                }
            }
        }
        seen
    }
}
