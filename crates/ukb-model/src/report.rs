use serde::{Deserialize, Serialize};

/// One row of the field mapping table: a dictionary row that matched the
/// request, with its derived table file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub path: String,
    pub file_path: String,
    #[serde(rename = "fieldid")]
    pub field_id: String,
    pub field: String,
}

/// A planned field for which no column reached the merged output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnmatchedField {
    #[serde(rename = "fieldid")]
    pub identifier: String,
    #[serde(rename = "field")]
    pub display_name: String,
}
