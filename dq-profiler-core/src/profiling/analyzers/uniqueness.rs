//! Missing and distinct value ratios, and candidate key detection.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::{ratio, value_key};
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["missing_ratio", "unique_ratio", "candidate_key"];

/// Marker for a column whose present values are all distinct.
pub const CANDIDATE_KEY: &str = "SIM";

/// Marker for any other column.
pub const NOT_CANDIDATE_KEY: &str = "-";

/// `(missing / length, distinct / length, candidate key marker)`.
///
/// Distinct values exclude nulls. Undefined for an empty sample.
pub fn analyze(
    _column: &str,
    _semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    let length = values.len();
    if length == 0 {
        return None;
    }

    let missing = values.iter().filter(|v| v.is_null()).count();
    let distinct: HashSet<String> = values
        .iter()
        .filter(|v| !v.is_null())
        .map(value_key)
        .collect();

    let is_candidate_key = distinct.len() == length - missing && !distinct.is_empty();
    let marker = if is_candidate_key {
        CANDIDATE_KEY
    } else {
        NOT_CANDIDATE_KEY
    };

    Some(vec![
        ratio(missing, length),
        ratio(distinct.len(), length),
        JsonValue::String(marker.to_string()),
    ])
}
