//! SQLite dialect.
//!
//! SQLite determines type affinity from declared type names, so the semantic
//! mapping applies the affinity rules instead of an exact lookup:
//! 1. Contains "INT" -> NUMERIC
//! 2. Contains "CHAR", "CLOB", or "TEXT" -> STRING
//! 3. Contains "BLOB" -> BLOB
//! 4. Contains "REAL", "FLOA", or "DOUB" -> FLOAT
//! 5. Contains "DATE" or "TIME" -> DATE
//! 6. Contains "NUM", "DEC" or "BOOL" -> NUMERIC

use super::{Dialect, SampleRequest, base_type_name, where_clause};
use crate::models::{SemanticType, TableRef};

/// SQLite SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn semantic_type(&self, native_type: &str) -> Option<SemanticType> {
        let base = base_type_name(native_type).to_uppercase();
        if base.is_empty() {
            return None;
        }

        if base.contains("INT") {
            Some(SemanticType::Numeric)
        } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            Some(SemanticType::String)
        } else if base.contains("BLOB") {
            Some(SemanticType::Blob)
        } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
            Some(SemanticType::Float)
        } else if base.contains("DATE") || base.contains("TIME") {
            Some(SemanticType::Date)
        } else if base.contains("NUM") || base.contains("DEC") || base.contains("BOOL") {
            Some(SemanticType::Numeric)
        } else {
            None
        }
    }

    fn list_columns_sql(&self, _database: Option<&str>, _schema: Option<&str>) -> String {
        r#"
    SELECT
        '' AS database_name,
        '' AS schema_name,
        m.name AS table_name,
        UPPER(m.type) AS table_type,
        p.cid AS ordinal,
        p.name AS column_name,
        p.type AS data_type
    FROM sqlite_master AS m, pragma_table_info(m.name) AS p
    WHERE m.type IN ('table', 'view')
      AND m.name NOT LIKE 'sqlite_%'
    ORDER BY m.name, p.cid
    "#
        .to_string()
    }

    fn table_name(&self, table: &TableRef) -> String {
        format!("main.{}", self.quote_identifier(&table.table))
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn build_sample_query(&self, request: &SampleRequest) -> String {
        let columns: Vec<String> = request
            .columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect();

        format!(
            "select {} FROM {}{} ORDER BY RANDOM() LIMIT {}",
            columns.join(", "),
            self.table_name(&request.table),
            where_clause(request.filter.as_deref()),
            request.sample_size
        )
    }
}
