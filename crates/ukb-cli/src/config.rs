//! Run configuration loading.
//!
//! Precedence, lowest first: built-in defaults, the optional TOML file,
//! then command-line overrides applied by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use ukb_model::ExtractOptions;

/// Parse options from TOML text. Missing keys keep their defaults.
pub fn parse_options(text: &str) -> Result<ExtractOptions> {
    let options: ExtractOptions = toml::from_str(text).context("parse configuration")?;
    Ok(options)
}

/// Load options from a TOML file, or defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<ExtractOptions> {
    let Some(path) = path else {
        return Ok(ExtractOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    let options =
        parse_options(&text).with_context(|| format!("load configuration {}", path.display()))?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn partial_file_keeps_defaults() {
        let options = parse_options(
            r#"
data_root = "/data/raw"
chunk_rows = 1000
delimiters = [",", "\t"]
"#,
        )
        .unwrap();
        assert_eq!(options.data_root, PathBuf::from("/data/raw"));
        assert_eq!(options.chunk_rows, 1000);
        assert_eq!(options.delimiters, vec![',', '\t']);
        assert_eq!(options.output_id_column, "participant.eid");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_options("chunk_size = 10").is_err());
    }

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(load_options(None).unwrap(), ExtractOptions::default());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let error = load_options(Some(Path::new("/nonexistent/ukb.toml"))).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/ukb.toml"));
    }
}
