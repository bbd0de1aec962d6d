//! Header name standardization.

use std::sync::LazyLock;

use regex::Regex;

static INSTANCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^|]*?)\s*\|\s*Instance\s+(\S+)\s*(?:\|\s*Array\s+(\S+)\s*)?(?:\|.*)?$")
        .expect("valid instance header regex")
});

/// Rewrites `Name | Instance X | Array Y` to `Name_iX_aY`, and
/// `Name | Instance X` to `Name_iX`.
///
/// Returns `None` when the name has no instance part, so applying it to its
/// own output is a no-op.
pub fn standardize_column_name(name: &str) -> Option<String> {
    if !name.contains("| Instance") {
        return None;
    }
    let captures = INSTANCE_HEADER.captures(name)?;
    let base = captures.get(1).map_or("", |m| m.as_str());
    let instance = captures.get(2).map_or("", |m| m.as_str());
    let standardized = match captures.get(3) {
        Some(array) => format!("{base}_i{instance}_a{}", array.as_str()),
        None => format!("{base}_i{instance}"),
    };
    Some(standardized)
}
