//! SQL Server dialect.

use super::{Dialect, SampleRequest, base_type_name, where_clause};
use crate::models::{SemanticType, TableRef};

/// SQL Server SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn semantic_type(&self, native_type: &str) -> Option<SemanticType> {
        match base_type_name(native_type).as_str() {
            "date" | "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" | "time" => {
                Some(SemanticType::Date)
            }
            "bigint" | "numeric" | "bit" | "smallint" | "tinyint" | "decimal" | "int" | "money"
            | "smallmoney" => Some(SemanticType::Numeric),
            "float" | "real" => Some(SemanticType::Float),
            "char" | "varchar" | "text" | "nchar" | "nvarchar" | "ntext" | "uniqueidentifier" => {
                Some(SemanticType::String)
            }
            "binary" | "varbinary" | "image" => Some(SemanticType::Blob),
            _ => None,
        }
    }

    fn list_columns_sql(&self, _database: Option<&str>, _schema: Option<&str>) -> String {
        r#"
        select
            DB_NAME() as database_name,
            schema_name(tab.schema_id) as schema_name,
            tab.name as table_name,
            tab.table_type,
            col.column_id as ordinal,
            col.name as column_name,
            t.name as data_type
        from (
            select object_id, schema_id, name, 'TABLE' as table_type from sys.tables
            union all
            select object_id, schema_id, name, 'VIEW' as table_type from sys.views
        ) as tab
        inner join sys.columns as col
            on tab.object_id = col.object_id
        left join sys.types as t
            on col.user_type_id = t.user_type_id
        order by schema_name, table_name, ordinal
        "#
        .to_string()
    }

    fn table_name(&self, table: &TableRef) -> String {
        let schema = if table.schema.is_empty() {
            "dbo"
        } else {
            table.schema.as_str()
        };
        format!(
            "{}.{}.{}",
            self.quote_identifier(&table.database),
            self.quote_identifier(schema),
            self.quote_identifier(&table.table)
        )
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn build_sample_query(&self, request: &SampleRequest) -> String {
        let columns: Vec<String> = request
            .columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect();

        let sample = if request.row_count > request.sample_size {
            format!(" TABLESAMPLE({} ROWS)", request.sample_size)
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
