//! Column match types produced by header resolution.

use serde::{Deserialize, Serialize};

/// Which header-matching rule produced a match.
///
/// Variants are declared in priority order; the resolver tries them in this
/// order and stops at the first one that yields any column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// `<prefix><id>_i<instance>[_a<repeat>]`
    RepeatedMeasurement,
    /// `<prefix><id>` with no instance suffix.
    Prefixed,
    /// Header contains the field's display name.
    DisplayName,
    /// Loose identifier heuristics (exact, substring, `<id>-`, `<id>_`, `p<id>`, `f<id>_`).
    Fallback,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepeatedMeasurement => "repeated-measurement",
            Self::Prefixed => "prefixed",
            Self::DisplayName => "display-name",
            Self::Fallback => "fallback",
        }
    }
}

/// A physical header column selected for one identifier, with the name it
/// takes in the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub physical_column: String,
    pub canonical_name: String,
    pub instance: Option<u32>,
    pub repeat: Option<u32>,
}

impl ColumnMatch {
    /// A match whose output name is the physical name unchanged.
    pub fn unchanged(physical_column: impl Into<String>) -> Self {
        let physical_column = physical_column.into();
        Self {
            canonical_name: physical_column.clone(),
            physical_column,
            instance: None,
            repeat: None,
        }
    }

    /// Ordering key; missing parts count as zero.
    pub fn sort_key(&self) -> (u32, u32) {
        (self.instance.unwrap_or(0), self.repeat.unwrap_or(0))
    }
}
