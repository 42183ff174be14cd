//! Most frequent value.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use super::{sorted_non_null, value_key};
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["mode"];

/// Most frequent non-null value; ties go to the smallest value.
///
/// Undefined for an empty sample, null when every value is null.
pub fn analyze(
    _column: &str,
    _semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    if values.is_empty() {
        return None;
    }

    // Mixed-type samples sort by text, so equal keys need not be adjacent.
    let sorted = sorted_non_null(values);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in &sorted {
        *counts.entry(value_key(value)).or_default() += 1;
    }

    let mut best: Option<(&JsonValue, usize)> = None;
    for value in sorted {
        let count = counts.get(&value_key(value)).copied().unwrap_or_default();
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }

    Some(vec![best.map_or(JsonValue::Null, |(value, _)| value.clone())])
}
