//! Read-only field dictionary index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One dictionary row: a field identifier, its display name, and the
/// hierarchical path of the table that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Numeric field identifier, kept as text (e.g. "21").
    pub identifier: String,
    /// Human-readable field name (e.g. "Height").
    pub display_name: String,
    /// Hierarchical table path as written in the dictionary
    /// (e.g. "Physical > BodySize").
    pub table_path: String,
}

impl FieldDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        table_path: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            table_path: table_path.into(),
        }
    }
}

/// Lookup built once from the dictionary and never mutated afterwards.
///
/// Rows are kept in dictionary order so that planning follows the same
/// traversal order as the source file. When an identifier appears on several
/// rows, the first row decides its display name.
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    fields: Vec<FieldDescriptor>,
    display_names: BTreeMap<String, usize>,
}

impl DictionaryIndex {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut display_names = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            display_names
                .entry(field.identifier.clone())
                .or_insert(position);
        }
        Self {
            fields,
            display_names,
        }
    }

    /// All rows in dictionary order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.display_names.contains_key(identifier)
    }

    /// Canonical display name for an identifier.
    pub fn display_name(&self, identifier: &str) -> Option<&str> {
        self.display_names
            .get(identifier)
            .map(|&position| self.fields[position].display_name.as_str())
    }
}
