//! Oracle dialect.
//!
//! Oracle has no schema level below the owner, so `schema_name` is always
//! NULL and the owner is reported as the database.

use super::{Dialect, SampleRequest, base_type_name, where_clause};
use crate::models::{SemanticType, TableRef};

/// Lowest sampling percentage Oracle accepts in practice.
const MIN_SAMPLE_PERCENT: f64 = 0.1;

/// Oracle SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Percentage of rows to sample so that roughly `sample_size` rows come back.
    fn sample_percent(row_count: u64, sample_size: u64) -> f64 {
        if row_count == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let percent = sample_size as f64 * 100.0 / row_count as f64;
        percent.max(MIN_SAMPLE_PERCENT)
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn semantic_type(&self, native_type: &str) -> Option<SemanticType> {
        match base_type_name(native_type).as_str() {
            "date" | "timestamp" => Some(SemanticType::Date),
            "number" | "numeric" | "integer" | "int" | "smallint" | "decimal" => {
                Some(SemanticType::Numeric)
            }
            "float" | "binary_float" | "binary_double" => Some(SemanticType::Float),
            "char" | "nchar" | "varchar" | "varchar2" | "nvarchar2" | "clob" | "nclob"
            | "string" => Some(SemanticType::String),
            "blob" | "raw" | "long raw" | "bfile" => Some(SemanticType::Blob),
            _ => None,
        }
    }

    fn list_columns_sql(&self, database: Option<&str>, _schema: Option<&str>) -> String {
        let owner_filter = database
            .filter(|d| !d.is_empty())
            .map(|d| format!("where col.owner = '{}'", d.replace('\'', "''")))
            .unwrap_or_default();

        format!(
            r#"
        select
            col.owner as database_name,
            NULL as schema_name,
            col.table_name as table_name,
            'TABLE' as table_type,
            col.column_id as ordinal,
            col.column_name as column_name,
            col.data_type as data_type
        from sys.all_tab_columns col
        inner join sys.all_tables t
            on col.owner = t.owner
           and col.table_name = t.table_name
        {}
        order by database_name, table_name, ordinal
        "#,
            owner_filter
        )
    }

    fn table_name(&self, table: &TableRef) -> String {
        if table.database.is_empty() {
            self.quote_identifier(&table.table)
        } else {
            format!(
                "{}.{}",
                self.quote_identifier(&table.database),
                self.quote_identifier(&table.table)
            )
        }
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

        // SAMPLE belongs to the table reference, before WHERE
        let sample = if request.row_count > request.sample_size {
            format!(
                " SAMPLE({:.2})",
                Self::sample_percent(request.row_count, request.sample_size)
            )
        } else {
            String::new()
        };

        format!(
            "select {} FROM {}{}{}",
            columns.join(", "),
            self.table_name(&request.table),
            sample,
            where_clause(request.filter.as_deref())
        )
    }
}
