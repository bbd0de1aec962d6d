//! Header column resolution.
//!
//! Each strategy is a pure function from a [`ResolveContext`] to the columns
//! it accepts. Strategies run in [`MatchStrategy`] priority order and the
//! first non-empty result wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use ukb_model::{ColumnMatch, DictionaryIndex, ExtractOptions, MatchStrategy};

/// `_i<instance>` with an optional `_a<repeat>`, and nothing else.
static INSTANCE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_i(\d+)(?:_a(\d+))?$").expect("valid instance suffix regex"));
static INSTANCE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_i(\d+)").expect("valid instance regex"));
static REPEAT_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_a(\d+)").expect("valid repeat regex"));

/// Inputs shared by every strategy for one identifier in one table.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub header: &'a [String],
    pub identifier: &'a str,
    pub display_name: &'a str,
    pub prefix: &'a str,
}

type Strategy = fn(&ResolveContext<'_>) -> Vec<ColumnMatch>;

const STRATEGIES: [(MatchStrategy, Strategy); 4] = [
    (MatchStrategy::RepeatedMeasurement, repeated_measurement),
    (MatchStrategy::Prefixed, prefixed),
    (MatchStrategy::DisplayName, display_name_substring),
    (MatchStrategy::Fallback, fallback),
];

fn parse_index(text: Option<regex::Match<'_>>) -> Option<u32> {
    text.and_then(|m| m.as_str().parse().ok())
}

fn sort_by_position(matches: &mut [ColumnMatch]) {
    matches.sort_by_key(ColumnMatch::sort_key);
}

/// `<prefix><id>_i<n>[_a<m>]`, renamed to `<display>_i<n>[_a<m>]`.
fn repeated_measurement(ctx: &ResolveContext<'_>) -> Vec<ColumnMatch> {
    let stem = format!("{}{}", ctx.prefix, ctx.identifier);
    let mut matches: Vec<ColumnMatch> = ctx
        .header
        .iter()
        .filter_map(|column| {
            let suffix = column.strip_prefix(stem.as_str())?;
            let captures = INSTANCE_SUFFIX.captures(suffix)?;
            let instance = parse_index(captures.get(1))?;
            let repeat = match captures.get(2) {
                Some(m) => Some(m.as_str().parse().ok()?),
                None => None,
            };
            let canonical_name = match repeat {
                Some(repeat) => format!("{}_i{instance}_a{repeat}", ctx.display_name),
                None => format!("{}_i{instance}", ctx.display_name),
            };
            Some(ColumnMatch {
                physical_column: column.clone(),
                canonical_name,
                instance: Some(instance),
                repeat,
            })
        })
        .collect();
    sort_by_position(&mut matches);
    matches
}

/// Exactly `<prefix><id>`, renamed to the display name.
fn prefixed(ctx: &ResolveContext<'_>) -> Vec<ColumnMatch> {
    let stem = format!("{}{}", ctx.prefix, ctx.identifier);
    ctx.header
        .iter()
        .find(|column| **column == stem)
        .map(|column| ColumnMatch {
            physical_column: column.clone(),
            canonical_name: ctx.display_name.to_string(),
            instance: None,
            repeat: None,
        })
        .into_iter()
        .collect()
}

/// Every column whose name contains the display name, names unchanged.
fn display_name_substring(ctx: &ResolveContext<'_>) -> Vec<ColumnMatch> {
    if ctx.display_name.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<ColumnMatch> = ctx
        .header
        .iter()
        .filter(|column| column.contains(ctx.display_name))
        .map(|column| ColumnMatch {
            instance: parse_index(INSTANCE_PART.captures(column).and_then(|c| c.get(1))),
            repeat: parse_index(REPEAT_PART.captures(column).and_then(|c| c.get(1))),
            ..ColumnMatch::unchanged(column.as_str())
        })
        .collect();
    sort_by_position(&mut matches);
    matches
}

/// First column that looks like it carries the identifier, name unchanged.
fn fallback(ctx: &ResolveContext<'_>) -> Vec<ColumnMatch> {
    let id = ctx.identifier;
    if id.is_empty() {
        return Vec::new();
    }
    let numeric = id.bytes().all(|b| b.is_ascii_digit());
    ctx.header
        .iter()
        .find(|column| {
            column.as_str() == id
                || column.contains(id)
                || (numeric
                    && (column.starts_with(&format!("{id}-"))
                        || column.starts_with(&format!("{id}_"))
                        || column.as_str() == format!("p{id}")
                        || column.starts_with(&format!("f{id}_"))))
        })
        .map(|column| ColumnMatch::unchanged(column.as_str()))
        .into_iter()
        .collect()
}

/// How one identifier resolved against one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierResolution {
    pub identifier: String,
    pub strategy: MatchStrategy,
    pub matches: Vec<ColumnMatch>,
}

/// Resolution of every requested identifier against one table header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableResolution {
    pub resolved: Vec<IdentifierResolution>,
    pub unresolved: Vec<String>,
}

impl TableResolution {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn resolved_identifiers(&self) -> Vec<&str> {
        self.resolved.iter().map(|r| r.identifier.as_str()).collect()
    }

    /// Columns to read, in resolution order, each with the identifier that
    /// selected it. A physical column chosen by several identifiers appears
    /// once, owned by the first.
    pub fn selections(&self) -> Vec<(&str, &ColumnMatch)> {
        let mut seen = HashSet::new();
        self.resolved
            .iter()
            .flat_map(|resolution| {
                resolution
                    .matches
                    .iter()
                    .map(move |m| (resolution.identifier.as_str(), m))
            })
            .filter(|&(_, m)| seen.insert(m.physical_column.as_str()))
            .collect()
    }
}

/// Resolves identifiers against table headers using the dictionary's
/// display names.
#[derive(Debug, Clone, Copy)]
pub struct ColumnResolver<'a> {
    index: &'a DictionaryIndex,
    prefix: &'a str,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(index: &'a DictionaryIndex, options: &'a ExtractOptions) -> Self {
        Self {
            index,
            prefix: &options.column_prefix,
        }
    }

    /// Try each strategy in priority order; `None` when all come up empty.
    pub fn resolve_identifier(
        &self,
        header: &[String],
        identifier: &str,
    ) -> Option<IdentifierResolution> {
        let ctx = ResolveContext {
            header,
            identifier,
            display_name: self.index.display_name(identifier).unwrap_or_default(),
            prefix: self.prefix,
        };
        STRATEGIES.iter().find_map(|(strategy, run)| {
            let matches = run(&ctx);
            trace!(identifier, strategy = strategy.as_str(), matches = matches.len(), "tried strategy");
            (!matches.is_empty()).then(|| IdentifierResolution {
                identifier: identifier.to_string(),
                strategy: *strategy,
                matches,
            })
        })
    }

    /// Resolve every identifier; misses are recorded, not fatal.
    pub fn resolve_table(&self, header: &[String], identifiers: &[String]) -> TableResolution {
        let mut resolution = TableResolution::default();
        for identifier in identifiers {
            match self.resolve_identifier(header, identifier) {
                Some(resolved) => {
                    debug!(
                        identifier = %identifier,
                        strategy = resolved.strategy.as_str(),
                        columns = resolved.matches.len(),
                        "resolved identifier"
                    );
                    resolution.resolved.push(resolved);
                }
                None => {
                    debug!(identifier = %identifier, "identifier has no matching column");
                    resolution.unresolved.push(identifier.clone());
                }
            }
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| (*c).to_string()).collect()
    }

    fn ctx<'a>(header: &'a [String], identifier: &'a str, display_name: &'a str) -> ResolveContext<'a> {
        ResolveContext {
            header,
            identifier,
            display_name,
            prefix: "participant.p",
        }
    }

    fn names(matches: &[ColumnMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.canonical_name.as_str()).collect()
    }

    #[test]
    fn repeated_measurement_sorts_and_renames() {
        let h = header(&[
            "participant.eid",
            "participant.p21_i1",
            "participant.p21_i0_a1",
            "participant.p21_i0",
            "participant.p210_i0",
            "participant.p21_i0_extra",
        ]);
        let matches = repeated_measurement(&ctx(&h, "21", "Height"));
        assert_eq!(names(&matches), vec!["Height_i0", "Height_i0_a1", "Height_i1"]);
        assert_eq!(matches[1].physical_column, "participant.p21_i0_a1");
        assert_eq!(matches[1].repeat, Some(1));
    }

    #[test]
    fn prefix_is_matched_literally() {
        let h = header(&["participantXp21_i0"]);
        assert!(repeated_measurement(&ctx(&h, "21", "Height")).is_empty());
    }

    #[test]
    fn prefixed_requires_exact_name() {
        let h = header(&["participant.p21", "participant.p211"]);
        let matches = prefixed(&ctx(&h, "21", "Height"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].canonical_name, "Height");
        assert_eq!(matches[0].physical_column, "participant.p21");
    }

    #[test]
    fn display_name_keeps_physical_names() {
        let h = header(&["eid", "Height_i1", "Standing Height_i0_a2", "Height_i0", "Weight"]);
        let matches = display_name_substring(&ctx(&h, "21", "Height"));
        assert_eq!(
            names(&matches),
            vec!["Height_i0", "Standing Height_i0_a2", "Height_i1"]
        );
    }

    #[test]
    fn empty_display_name_matches_nothing() {
        let h = header(&["a", "b"]);
        assert!(display_name_substring(&ctx(&h, "21", "")).is_empty());
    }

    #[test]
    fn fallback_takes_first_candidate() {
        let h = header(&["eid", "f21_0_0", "21-0.0"]);
        let matches = fallback(&ctx(&h, "21", "Height"));
        assert_eq!(names(&matches), vec!["f21_0_0"]);

        let h = header(&["eid", "x"]);
        assert!(fallback(&ctx(&h, "21", "Height")).is_empty());
    }

    #[test]
    fn repeated_measurement_wins_over_prefixed() {
        let index = DictionaryIndex::new(vec![ukb_model::FieldDescriptor::new(
            "21",
            "Height",
            "Physical > BodySize",
        )]);
        let options = ExtractOptions::default();
        let resolver = ColumnResolver::new(&index, &options);
        let h = header(&["participant.eid", "participant.p21", "participant.p21_i0"]);

        let resolved = resolver.resolve_identifier(&h, "21").unwrap();
        assert_eq!(resolved.strategy, MatchStrategy::RepeatedMeasurement);
        assert_eq!(names(&resolved.matches), vec!["Height_i0"]);
    }

    #[test]
    fn unresolved_identifiers_do_not_block_others() {
        let index = DictionaryIndex::new(vec![
            ukb_model::FieldDescriptor::new("21", "Height", "P"),
            ukb_model::FieldDescriptor::new("50", "Weight", "P"),
        ]);
        let options = ExtractOptions::default();
        let resolver = ColumnResolver::new(&index, &options);
        let h = header(&["participant.eid", "participant.p21_i0"]);

        let resolution = resolver.resolve_table(&h, &["50".to_string(), "21".to_string()]);
        assert_eq!(resolution.resolved_identifiers(), vec!["21"]);
        assert_eq!(resolution.unresolved, vec!["50"]);
    }

    #[test]
    fn shared_physical_column_is_selected_once() {
        let index = DictionaryIndex::new(vec![
            ukb_model::FieldDescriptor::new("1", "Score", "P"),
            ukb_model::FieldDescriptor::new("2", "Score total", "P"),
        ]);
        let options = ExtractOptions::default();
        let resolver = ColumnResolver::new(&index, &options);
        let h = header(&["eid", "Score total"]);

        let resolution = resolver.resolve_table(&h, &["1".to_string(), "2".to_string()]);
        assert_eq!(resolution.resolved.len(), 2);
        let selected: Vec<(&str, &str)> = resolution
            .selections()
            .iter()
            .map(|(id, m)| (*id, m.physical_column.as_str()))
            .collect();
        assert_eq!(selected, vec![("1", "Score total")]);
    }
}
