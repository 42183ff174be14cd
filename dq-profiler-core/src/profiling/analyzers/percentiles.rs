//! Order statistics by nearest rank.

use serde_json::Value as JsonValue;

use super::sorted_non_null;
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["min", "P01", "P25", "P50", "P75", "P99", "max"];

/// Quantiles matching [`OUTPUTS`].
pub const QUANTILES: [f64; 7] = [0.0, 0.01, 0.25, 0.5, 0.75, 0.99, 1.0];

/// Index of quantile `q` in a sorted slice of `n > 0` values.
///
/// The position `q * (n - 1)` is rounded half to even.
pub fn nearest_rank(q: f64, n: usize) -> usize {
    let last = n.saturating_sub(1);
    let position = (q.clamp(0.0, 1.0) * last as f64).round_ties_even();
    (position as usize).min(last)
}

/// Values at [`QUANTILES`] over the non-null values. Undefined when there
/// are none.
pub fn analyze(
    _column: &str,
    _semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    let sorted = sorted_non_null(values);
    if sorted.is_empty() {
        return None;
    }

    Some(
        QUANTILES
            .iter()
            .map(|q| sorted[nearest_rank(*q, sorted.len())].clone())
            .collect(),
    )
}
