//! Conversion of SQLite rows into positional JSON values.

use super::QueryResult;
use base64::Engine;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Converts fetched rows into a [`QueryResult`].
///
/// Column names come from the first row; an empty result has no columns.
pub(super) fn rows_to_result(rows: &[SqliteRow]) -> QueryResult {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.columns().len())
                .map(|idx| extract_column_value(row, idx))
                .collect()
        })
        .collect();

    QueryResult { columns, rows }
}

/// Extracts one value as JSON.
///
/// SQLite is dynamically typed, so the storage class of the value decides
/// the conversion rather than the declared column type.
fn extract_column_value(row: &SqliteRow, idx: usize) -> JsonValue {
    let storage_class = match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return JsonValue::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return JsonValue::Null,
    };

    match storage_class.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(idx)
            .map(|n| JsonValue::Number(n.into()))
            .unwrap_or(JsonValue::Null),
        "REAL" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|bytes| {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                JsonValue::String(format!("base64:{}", encoded))
            })
            .unwrap_or(JsonValue::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}
