//! Hexadecimal digest detection.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use super::ratio;
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["hash_ratio"];

fn hash_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*[0-9a-fA-F]{32,}\s*$").ok())
        .as_ref()
}

/// Whether a value looks like a hex digest of at least 128 bits.
pub fn is_hash(text: &str) -> bool {
    hash_pattern().is_some_and(|p| p.is_match(text))
}

/// Fraction of all sampled values (nulls included) of a STRING column that
/// look like a hex digest.
pub fn analyze(
    _column: &str,
    semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    if semantic_type != Some(SemanticType::String) || values.is_empty() {
        return None;
    }

    let matches = values
        .iter()
        .filter(|v| v.as_str().is_some_and(is_hash))
        .count();

    Some(vec![ratio(matches, values.len())])
}
