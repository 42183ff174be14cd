//! Built-in column analyzers.
//!
//! Each analyzer is a pure function over the sampled values of one column.
//! Nulls are `JsonValue::Null`; every other JSON value counts as present.

pub mod hash;
pub mod mode;
pub mod names;
pub mod national_id;
pub mod percentiles;
pub mod uniqueness;

use std::cmp::Ordering;

use serde_json::Value as JsonValue;

use super::registry::AnalyzerRegistry;
use crate::Result;

/// Registers every built-in analyzer in report order.
///
/// # Errors
/// Propagates registration errors
pub fn register_builtins(registry: &mut AnalyzerRegistry) -> Result<()> {
    registry.register("uniqueness", uniqueness::OUTPUTS, uniqueness::analyze)?;
    registry.register("percentiles", percentiles::OUTPUTS, percentiles::analyze)?;
    registry.register("mode", mode::OUTPUTS, mode::analyze)?;
    registry.register("national_id", national_id::OUTPUTS, national_id::analyze)?;
    registry.register("hash", hash::OUTPUTS, hash::analyze)?;
    registry.register("names", names::OUTPUTS, names::analyze)?;
    Ok(())
}

/// `numerator / denominator` as a JSON number.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> JsonValue {
    if denominator == 0 {
        return JsonValue::Null;
    }
    serde_json::Number::from_f64(numerator as f64 / denominator as f64)
        .map_or(JsonValue::Null, JsonValue::Number)
}

/// Equality key for distinct counting. Integral floats equal their integer.
pub(crate) fn value_key(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("s:{}", s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                format!("n:{}", i)
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    format!("n:{}", f as i64)
                } else {
                    format!("n:{}", f)
                }
            } else {
                format!("n:{}", n)
            }
        }
        other => format!("o:{}", other),
    }
}

/// Text form of a present value, as used by the string analyzers.
pub(crate) fn value_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Non-null values in ascending order.
///
/// Values are ordered numerically when every one of them is a number, and
/// by their text form otherwise.
pub(crate) fn sorted_non_null(values: &[JsonValue]) -> Vec<&JsonValue> {
    let mut present: Vec<&JsonValue> = values.iter().filter(|v| !v.is_null()).collect();

    if present.iter().all(|v| v.is_number()) {
        present.sort_by(|a, b| compare_numbers(a, b));
    } else {
        present.sort_by_cached_key(|v| value_text(v).unwrap_or_default());
    }
    present
}

fn compare_numbers(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&b.as_f64().unwrap_or_default()),
    }
}
