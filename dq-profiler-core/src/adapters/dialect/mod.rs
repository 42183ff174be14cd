//! SQL dialects: per-engine SQL generation and native type mapping.
//!
//! Each supported engine implements [`Dialect`] once. Selection goes through
//! [`dialect_for_name`], an explicit name-to-implementation mapping; nothing
//! is discovered at runtime.
//!
//! Every column listing query returns the same aliases:
//! `database_name, schema_name, table_name, table_type, ordinal, column_name,
//! data_type`.

mod mssql;
mod oracle;
mod sqlite;

pub use mssql::SqlServerDialect;
pub use oracle::OracleDialect;
pub use sqlite::SqliteDialect;

use crate::Result;
use crate::models::{SemanticType, TableRef};

/// Names accepted by [`dialect_for_name`].
pub const SUPPORTED_DIALECTS: &[&str] = &["sqlite", "mssql", "oracle"];

/// Parameters of a sample query.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub table: TableRef,
    /// Columns to select, already restricted to non-BLOB columns
    pub columns: Vec<String>,
    pub row_count: u64,
    pub sample_size: u64,
    pub filter: Option<String>,
}

/// SQL generation capability implemented once per database engine.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Registry name of the dialect.
    fn name(&self) -> &'static str;

    /// Maps a native column type name to a semantic type.
    fn semantic_type(&self, native_type: &str) -> Option<SemanticType>;

    /// SQL listing every column visible in `database`/`schema`.
    fn list_columns_sql(&self, database: Option<&str>, schema: Option<&str>) -> String;

    /// Fully qualified table name as used in `FROM` clauses.
    fn table_name(&self, table: &TableRef) -> String;

    /// Quotes a column identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// SQL drawing a bounded sample of the requested columns.
    fn build_sample_query(&self, request: &SampleRequest) -> String;
}

/// Resolves a dialect by name.
///
/// # Errors
/// Returns a configuration error for names outside [`SUPPORTED_DIALECTS`].
pub fn dialect_for_name(name: &str) -> Result<Box<dyn Dialect>> {
    match name.to_ascii_lowercase().as_str() {
        "sqlite" => Ok(Box::new(SqliteDialect)),
        "mssql" | "sqlserver" => Ok(Box::new(SqlServerDialect)),
        "oracle" => Ok(Box::new(OracleDialect)),
        other => Err(crate::error::DqProfilerError::configuration(format!(
            "No dialect registered for '{}'. Supported: {}",
            other,
            SUPPORTED_DIALECTS.join(", ")
        ))),
    }
}

/// Lower-cases a native type and strips any `(length, scale)` suffix.
pub(crate) fn base_type_name(native_type: &str) -> String {
    let lower = native_type.trim().to_lowercase();
    match lower.find('(') {
        Some(idx) => lower[..idx].trim().to_string(),
        None => lower,
    }
}

/// Formats an optional `WHERE` clause.
pub(crate) fn where_clause(filter: Option<&str>) -> String {
    match filter {
        Some(f) if !f.trim().is_empty() => format!(" WHERE {}", f),
        _ => String::new(),
    }
}
