//! Column name conflict resolution.
//!
//! Suffixes run `A`..`Z`, then `AA`, `AB`, and so on. The first free suffix
//! is taken, so the same input order always produces the same names.

use std::collections::{HashMap, HashSet};

use polars::prelude::Column;
use tracing::debug;

/// `base` with the `n`-th suffix (`0` is `_A`).
pub fn suffixed_name(base: &str, n: usize) -> String {
    let mut letters = Vec::new();
    let mut rest = n + 1;
    while rest > 0 {
        rest -= 1;
        letters.push(char::from(b'A' + (rest % 26) as u8));
        rest /= 26;
    }
    let suffix: String = letters.into_iter().rev().collect();
    format!("{base}_{suffix}")
}

fn first_free_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    (0..)
        .map(|n| suffixed_name(base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// What conflict resolution did to one extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictRenameMap {
    /// `(original, new)` pairs in column order.
    pub renamed: Vec<(String, String)>,
    /// Names of columns dropped as content duplicates.
    pub dropped: Vec<String>,
}

impl ConflictRenameMap {
    pub fn is_empty(&self) -> bool {
        self.renamed.is_empty() && self.dropped.is_empty()
    }

    /// Fold another pass into this one.
    pub fn extend(&mut self, other: ConflictRenameMap) {
        self.renamed.extend(other.renamed);
        self.dropped.extend(other.dropped);
    }
}

/// Resolves name conflicts around one identifier column, which is never
/// renamed.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    id_column: String,
}

impl ConflictResolver {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
        }
    }

    /// Remove duplicate names inside one extract.
    ///
    /// Each later column sharing a name with an earlier one is compared
    /// value-for-value with the first occurrence: equal columns are dropped,
    /// different ones get the first free suffix. Extra identifier columns are
    /// always dropped.
    pub fn resolve_intra_extract(
        &self,
        columns: Vec<Column>,
    ) -> (Vec<Column>, ConflictRenameMap) {
        let original: HashSet<String> = columns.iter().map(|c| c.name().to_string()).collect();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut assigned: HashSet<String> = HashSet::new();
        let mut kept: Vec<Column> = Vec::with_capacity(columns.len());
        let mut map = ConflictRenameMap::default();

        for mut column in columns {
            let name = column.name().to_string();
            let Some(&first) = first_seen.get(&name) else {
                first_seen.insert(name, kept.len());
                kept.push(column);
                continue;
            };

            let identical = kept[first]
                .as_materialized_series()
                .equals_missing(column.as_materialized_series());
            if name == self.id_column || identical {
                debug!(column = %name, "dropping duplicate column with identical content");
                map.dropped.push(name);
                continue;
            }

            let new_name =
                first_free_name(&name, |c| original.contains(c) || assigned.contains(c));
            debug!(column = %name, renamed = %new_name, "renaming duplicate column with different content");
            column.rename(new_name.as_str().into());
            assigned.insert(new_name.clone());
            map.renamed.push((name, new_name));
            kept.push(column);
        }

        (kept, map)
    }

    /// Rename extract columns that already exist in the merged table.
    ///
    /// New names avoid the merged table's names, the extract's own names and
    /// names assigned earlier in this pass.
    pub fn resolve_against_merged(
        &self,
        columns: &mut [Column],
        merged: &[String],
    ) -> ConflictRenameMap {
        let merged: HashSet<&str> = merged.iter().map(String::as_str).collect();
        let own: HashSet<String> = columns.iter().map(|c| c.name().to_string()).collect();
        let mut assigned: HashSet<String> = HashSet::new();
        let mut map = ConflictRenameMap::default();

        for column in columns.iter_mut() {
            let name = column.name().to_string();
            if name == self.id_column || !merged.contains(name.as_str()) {
                continue;
            }
            let new_name = first_free_name(&name, |c| {
                merged.contains(c) || own.contains(c) || assigned.contains(c)
            });
            debug!(column = %name, renamed = %new_name, "renaming column that exists in merged output");
            column.rename(new_name.as_str().into());
            assigned.insert(new_name.clone());
            map.renamed.push((name, new_name));
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn text(name: &str, values: &[&str]) -> Column {
        Series::new(name.into(), values.to_vec()).into_column()
    }

    fn names(columns: &[Column]) -> Vec<String> {
        columns.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn suffix_sequence() {
        assert_eq!(suffixed_name("Height_i0", 0), "Height_i0_A");
        assert_eq!(suffixed_name("x", 1), "x_B");
        assert_eq!(suffixed_name("x", 25), "x_Z");
        assert_eq!(suffixed_name("x", 26), "x_AA");
        assert_eq!(suffixed_name("x", 27), "x_AB");
        assert_eq!(suffixed_name("x", 26 + 26 * 26), "x_AAA");
    }

    #[test]
    fn intra_extract_drops_identical_and_renames_different() {
        let resolver = ConflictResolver::new("participant.eid");
        let columns = vec![
            text("participant.eid", &["1", "2"]),
            text("Height_i0", &["170", "160"]),
            text("Height_i0", &["170", "160"]),
            text("Height_i0", &["171", "161"]),
        ];

        let (kept, map) = resolver.resolve_intra_extract(columns);
        assert_eq!(names(&kept), vec!["participant.eid", "Height_i0", "Height_i0_A"]);
        assert_eq!(map.dropped, vec!["Height_i0"]);
        assert_eq!(map.renamed, vec![("Height_i0".to_string(), "Height_i0_A".to_string())]);
    }

    #[test]
    fn intra_extract_skips_suffix_already_in_extract() {
        let resolver = ConflictResolver::new("participant.eid");
        let columns = vec![
            text("participant.eid", &["1"]),
            text("x", &["a"]),
            text("x_A", &["b"]),
            text("x", &["c"]),
            text("x", &["d"]),
        ];

        let (kept, _) = resolver.resolve_intra_extract(columns);
        assert_eq!(names(&kept), vec!["participant.eid", "x", "x_A", "x_B", "x_C"]);
    }

    #[test]
    fn extra_identifier_columns_are_dropped() {
        let resolver = ConflictResolver::new("participant.eid");
        let columns = vec![
            text("participant.eid", &["1"]),
            text("participant.eid", &["9"]),
            text("x", &["a"]),
        ];

        let (kept, map) = resolver.resolve_intra_extract(columns);
        assert_eq!(names(&kept), vec!["participant.eid", "x"]);
        assert_eq!(map.dropped, vec!["participant.eid"]);
    }

    #[test]
    fn against_merged_renames_collisions_only() {
        let resolver = ConflictResolver::new("participant.eid");
        let merged = vec![
            "participant.eid".to_string(),
            "Height_i0".to_string(),
            "Height_i0_A".to_string(),
            "Weight".to_string(),
        ];
        let mut columns = vec![
            text("participant.eid", &["1"]),
            text("Height_i0", &["a"]),
            text("Sex", &["b"]),
            text("Weight", &["c"]),
            text("Weight_A", &["d"]),
        ];

        let map = resolver.resolve_against_merged(&mut columns, &merged);
        assert_eq!(
            names(&columns),
            vec!["participant.eid", "Height_i0_B", "Sex", "Weight_B", "Weight_A"]
        );
        assert_eq!(map.renamed.len(), 2);
        assert!(map.dropped.is_empty());
    }
}
