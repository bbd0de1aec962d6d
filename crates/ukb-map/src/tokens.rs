//! Request token parsing and classification.

/// Splits a comma-separated request into trimmed, non-empty tokens.
///
/// The full-width comma (`，`) is accepted as a separator.
pub fn parse_input_string(input: &str) -> Vec<String> {
    input
        .split([',', '，'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Requested tokens split into identifiers (all ASCII digits) and display
/// names (everything else).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub identifiers: Vec<String>,
    pub names: Vec<String>,
}

impl QueryRequest {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut request = Self::default();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            let bucket = if token.bytes().all(|b| b.is_ascii_digit()) {
                &mut request.identifiers
            } else {
                &mut request.names
            };
            if !bucket.iter().any(|existing| existing == token) {
                bucket.push(token.to_string());
            }
        }
        request
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty() && self.names.is_empty()
    }

    pub fn wants(&self, identifier: &str, display_name: &str) -> bool {
        self.identifiers.iter().any(|id| id == identifier)
            || self.names.iter().any(|name| name == display_name)
    }
}
