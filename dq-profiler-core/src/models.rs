//! Data models for column discovery, sampling, and profiling results.
//!
//! Descriptors are computed once per environment from schema discovery and are
//! immutable afterwards. Samples live for a single profiling pass over one
//! table.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Semantic column type, derived from a dialect-native type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SemanticType {
    Date,
    Numeric,
    Float,
    String,
    Blob,
}

impl SemanticType {
    /// Canonical upper-case name, as used in rule predicates.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Date => "DATE",
            SemanticType::Numeric => "NUMERIC",
            SemanticType::Float => "FLOAT",
            SemanticType::String => "STRING",
            SemanticType::Blob => "BLOB",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully qualified table identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    /// Creates a table reference.
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Builds the column key for one column of this table.
    pub fn column(&self, column: impl Into<String>) -> ColumnKey {
        ColumnKey {
            database: self.database.clone(),
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

/// Column identity: (database, schema, table, column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// Column metadata produced by schema discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub table_type: String,
    pub column_name: String,
    pub ordinal: u32,
    pub native_type: String,
    /// `None` when the dialect has no mapping for the native type
    pub semantic_type: Option<SemanticType>,
}

impl ColumnDescriptor {
    /// Returns the table this column belongs to.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.database, &self.schema, &self.table)
    }

    /// Returns the identity key of this column.
    pub fn key(&self) -> ColumnKey {
        self.table_ref().column(&self.column_name)
    }

    /// Whether the column is a BLOB and therefore excluded from sampling.
    pub fn is_blob(&self) -> bool {
        self.semantic_type == Some(SemanticType::Blob)
    }

    /// Minimal descriptor for a column known only by its key.
    pub fn from_key(key: &ColumnKey) -> Self {
        Self {
            database: key.database.clone(),
            schema: key.schema.clone(),
            table: key.table.clone(),
            table_type: String::new(),
            column_name: key.column.clone(),
            ordinal: 0,
            native_type: String::new(),
            semantic_type: None,
        }
    }
}

/// Table row count, or `Unknown` when the count query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowCount {
    Known(u64),
    Unknown,
}

impl RowCount {
    /// Returns the count when known.
    pub fn known(&self) -> Option<u64> {
        match self {
            RowCount::Known(n) => Some(*n),
            RowCount::Unknown => None,
        }
    }
}

/// Table metadata derived from its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub table_type: String,
    pub column_count: usize,
    pub row_count: RowCount,
    /// Row filter active when the table was counted
    pub filter: Option<String>,
}

impl TableDescriptor {
    /// Returns the table identity.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.database, &self.schema, &self.table)
    }
}

/// A bounded, in-memory row set drawn from one table.
///
/// Rows are stored positionally; `columns[i]` names `row[i]` for every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl Sample {
    /// Creates a sample from column names and positional rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self { columns, rows }
    }

    /// Number of sampled rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sample holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the sample contains the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns one column's values in row order.
    pub fn column(&self, column: &str) -> Option<Vec<JsonValue>> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(JsonValue::Null))
                .collect(),
        )
    }

    /// Counts rows after dropping exact duplicates.
    pub fn distinct_rows(&self) -> usize {
        let mut seen: HashSet<String> = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            seen.insert(serde_json::to_string(row).unwrap_or_default());
        }
        seen.len()
    }
}

/// One profiled column: its descriptor, per-table derived fields, analyzer
/// outputs in registration order, and single-column validation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    #[serde(flatten)]
    pub column: ColumnDescriptor,
    pub row_count: Option<u64>,
    pub sample_size_actual: Option<usize>,
    pub distinct_sample_rows: Option<usize>,
    pub applied_filter: Option<String>,
    pub metrics: serde_json::Map<String, JsonValue>,
    pub validations: serde_json::Map<String, JsonValue>,
}

impl ColumnProfile {
    /// Creates an empty profile for a column.
    pub fn new(column: ColumnDescriptor) -> Self {
        Self {
            column,
            row_count: None,
            sample_size_actual: None,
            distinct_sample_rows: None,
            applied_filter: None,
            metrics: serde_json::Map::new(),
            validations: serde_json::Map::new(),
        }
    }

    /// Returns the identity key of the profiled column.
    pub fn key(&self) -> ColumnKey {
        self.column.key()
    }

    /// Looks up an analyzer output field.
    pub fn metric(&self, name: &str) -> Option<&JsonValue> {
        self.metrics.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: &str, semantic_type: Option<SemanticType>) -> ColumnDescriptor {
        ColumnDescriptor {
            database: "db".to_string(),
            schema: "dbo".to_string(),
            table: "people".to_string(),
            table_type: "TABLE".to_string(),
            column_name: name.to_string(),
            ordinal: 1,
            native_type: "varchar".to_string(),
            semantic_type,
        }
    }

    #[test]
    fn test_semantic_type_serialization() {
        let value = serde_json::to_value(SemanticType::String).unwrap();
        assert_eq!(value, json!("STRING"));
        let parsed: SemanticType = serde_json::from_value(json!("BLOB")).unwrap();
        assert_eq!(parsed, SemanticType::Blob);
        assert_eq!(SemanticType::Date.to_string(), "DATE");
    }

    #[test]
    fn test_column_key_and_blob() {
        let col = descriptor("photo", Some(SemanticType::Blob));
        assert!(col.is_blob());
        assert_eq!(col.key(), TableRef::new("db", "dbo", "people").column("photo"));
        assert!(!descriptor("name", None).is_blob());
    }

    #[test]
    fn test_row_count_serialization() {
        assert_eq!(serde_json::to_value(RowCount::Known(5)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(RowCount::Unknown).unwrap(), json!(null));
        assert_eq!(RowCount::Known(7).known(), Some(7));
        assert_eq!(RowCount::Unknown.known(), None);
    }

    #[test]
    fn test_sample_column_access() {
        let sample = Sample::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![json!(1), json!("Ana")],
                vec![json!(2), json!(null)],
                vec![json!(1), json!("Ana")],
            ],
        );

        assert_eq!(sample.len(), 3);
        assert!(sample.has_column("name"));
        assert!(!sample.has_column("photo"));
        assert_eq!(
            sample.column("name").unwrap(),
            vec![json!("Ana"), json!(null), json!("Ana")]
        );
        assert!(sample.column("photo").is_none());
        assert_eq!(sample.distinct_rows(), 2);
    }

    #[test]
    fn test_column_profile_serializes_flat_descriptor() {
        let mut profile = ColumnProfile::new(descriptor("name", Some(SemanticType::String)));
        profile.metrics.insert("missing_ratio".to_string(), json!(0.5));

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["column_name"], json!("name"));
        assert_eq!(value["semantic_type"], json!("STRING"));
        assert_eq!(value["metrics"]["missing_ratio"], json!(0.5));
        assert_eq!(profile.metric("missing_ratio"), Some(&json!(0.5)));
    }
}
