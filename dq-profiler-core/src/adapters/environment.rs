//! Schema discovery and query execution on top of a [`DataSource`].
//!
//! An [`Environment`] owns the column and table descriptors of one database
//! connection. Both sets are computed lazily on first use and cached for the
//! lifetime of the environment; callers only ever read them.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tokio::sync::OnceCell;

use super::config::EnvironmentScope;
use super::dialect::{Dialect, SampleRequest, where_clause};
use super::{DataSource, QueryResult};
use crate::Result;
use crate::models::{ColumnDescriptor, RowCount, Sample, TableDescriptor, TableRef};
use crate::template;

/// Placeholder receiving the filtered table expression in every template.
pub const TABLE_PLACEHOLDER: &str = "tabela";

const COUNT_ROWS_SQL: &str = "select count(1) as v FROM {tabela} x";

/// A connected database plus its cached schema metadata.
pub struct Environment {
    source: Box<dyn DataSource>,
    scope: EnvironmentScope,
    filter: Option<String>,
    columns: OnceCell<Vec<ColumnDescriptor>>,
    tables: OnceCell<Vec<TableDescriptor>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("dialect", &self.source.dialect().name())
            .field("scope", &self.scope)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Wraps a data source with an unrestricted scope and no row filter.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            scope: EnvironmentScope::default(),
            filter: None,
            columns: OnceCell::new(),
            tables: OnceCell::new(),
        }
    }

    /// Builder method to restrict discovery.
    pub fn with_scope(mut self, scope: EnvironmentScope) -> Self {
        self.scope = scope;
        self
    }

    /// Builder method to set the row filter applied to every query.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    /// SQL dialect of the underlying source.
    pub fn dialect(&self) -> &dyn Dialect {
        self.source.dialect()
    }

    /// Active row filter.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Discovery scope.
    pub fn scope(&self) -> &EnvironmentScope {
        &self.scope
    }

    /// Tests the underlying connection.
    ///
    /// # Errors
    /// Returns error if the database cannot be reached
    pub async fn test_connection(&self) -> Result<()> {
        self.source.test_connection().await
    }

    /// Every column inside the scope, in discovery order.
    ///
    /// # Errors
    /// Returns error if the column listing query fails
    pub async fn columns(&self) -> Result<&[ColumnDescriptor]> {
        let columns = self
            .columns
            .get_or_try_init(|| self.discover_columns())
            .await?;
        Ok(columns.as_slice())
    }

    /// Columns of one table, in ordinal order.
    ///
    /// # Errors
    /// Returns error if column discovery fails
    pub async fn table_columns(&self, table: &TableRef) -> Result<Vec<&ColumnDescriptor>> {
        let mut columns: Vec<&ColumnDescriptor> = self
            .columns()
            .await?
            .iter()
            .filter(|c| {
                c.database == table.database && c.schema == table.schema && c.table == table.table
            })
            .collect();
        columns.sort_by_key(|c| c.ordinal);
        Ok(columns)
    }

    /// Every table inside the scope, sorted by (database, schema, table),
    /// each with its row count.
    ///
    /// # Errors
    /// Returns error if column discovery fails. Row count failures are not
    /// errors; they yield [`RowCount::Unknown`].
    pub async fn tables(&self) -> Result<&[TableDescriptor]> {
        let tables = self
            .tables
            .get_or_try_init(|| self.discover_tables())
            .await?;
        Ok(tables.as_slice())
    }

    /// Counts the rows of a table after the row filter.
    pub async fn count_rows(&self, table: &TableRef) -> RowCount {
        self.count_with(COUNT_ROWS_SQL, table).await
    }

    /// Filtered source-table expression: `(SELECT * FROM <table> [WHERE <filter>])`.
    pub fn table_expression(&self, table: &TableRef) -> String {
        format!(
            "(SELECT * FROM {}{})",
            self.dialect().table_name(table),
            where_clause(self.filter())
        )
    }

    /// Draws a sample of the given columns.
    ///
    /// When the query returns no rows the sample still lists the requested
    /// columns so callers can report every column.
    ///
    /// # Errors
    /// Returns error if the sample query fails
    pub async fn sample(
        &self,
        table: &TableRef,
        columns: &[String],
        row_count: u64,
        sample_size: u64,
    ) -> Result<Sample> {
        if columns.is_empty() {
            return Ok(Sample::default());
        }

        let request = SampleRequest {
            table: table.clone(),
            columns: columns.to_vec(),
            row_count,
            sample_size,
            filter: self.filter.clone(),
        };
        let sql = self.dialect().build_sample_query(&request);
        tracing::debug!("Sampling {}: {}", table, sql);

        let result = self.source.query(&sql).await?;
        let mut sample: Sample = result.into();
        if sample.columns.is_empty() {
            sample.columns = columns.to_vec();
        }
        Ok(sample)
    }

    /// Renders a SQL template and executes it.
    ///
    /// The `{tabela}` placeholder receives [`Self::table_expression`] unless
    /// `substitutions` already provides it.
    ///
    /// # Errors
    /// Returns a `Template` error for unknown placeholders, or a `Query`
    /// error when execution fails
    pub async fn execute(
        &self,
        sql_template: &str,
        table: &TableRef,
        substitutions: &BTreeMap<String, String>,
    ) -> Result<QueryResult> {
        let mut values = substitutions.clone();
        values
            .entry(TABLE_PLACEHOLDER.to_string())
            .or_insert_with(|| self.table_expression(table));

        let sql = template::render(sql_template, &values)?;
        tracing::debug!("{}", sql);
        self.source.query(&sql).await
    }

    async fn count_with(&self, sql_template: &str, table: &TableRef) -> RowCount {
        let outcome = self
            .execute(sql_template, table, &BTreeMap::new())
            .await
            .and_then(|result| {
                result.first_value().and_then(value_as_u64).ok_or_else(|| {
                    crate::error::DqProfilerError::query("count query returned no number")
                })
            });

        match outcome {
            Ok(n) => RowCount::Known(n),
            Err(e) => {
                tracing::warn!("Could not count rows of {}: {}", table, e);
                RowCount::Unknown
            }
        }
    }

    async fn discover_columns(&self) -> Result<Vec<ColumnDescriptor>> {
        let dialect = self.dialect();
        let sql = dialect.list_columns_sql(
            self.scope.database.as_deref(),
            self.scope.schema.as_deref(),
        );
        tracing::info!("Listing columns");
        tracing::debug!("{}", sql);

        let result = self.source.query(&sql).await?;
        let index = FieldIndex::new(&result.columns);

        let mut columns = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let schema = index.text(row, "schema_name");
            let table = index.text(row, "table_name");
            if !self.scope.includes(&schema, &table) {
                continue;
            }

            let native_type = index.text(row, "data_type");
            columns.push(ColumnDescriptor {
                database: index.text(row, "database_name"),
                schema,
                table,
                table_type: index.text(row, "table_type"),
                column_name: index.text(row, "column_name"),
                ordinal: index.number(row, "ordinal"),
                semantic_type: dialect.semantic_type(&native_type),
                native_type,
            });
        }

        tracing::info!("Found {} columns", columns.len());
        Ok(columns)
    }

    async fn discover_tables(&self) -> Result<Vec<TableDescriptor>> {
        let mut grouped: BTreeMap<TableRef, (String, usize)> = BTreeMap::new();
        for column in self.columns().await? {
            let entry = grouped
                .entry(column.table_ref())
                .or_insert_with(|| (column.table_type.clone(), 0));
            entry.1 += 1;
        }

        let mut tables = Vec::with_capacity(grouped.len());
        for (table, (table_type, column_count)) in grouped {
            tracing::info!("Counting rows of {}", table);
            let row_count = self.count_rows(&table).await;
            tables.push(TableDescriptor {
                database: table.database,
                schema: table.schema,
                table: table.table,
                table_type,
                column_count,
                row_count,
                filter: self.filter.clone(),
            });
        }

        Ok(tables)
    }
}

/// Case-insensitive lookup of result columns by alias.
struct FieldIndex {
    names: Vec<String>,
}

impl FieldIndex {
    fn new(columns: &[String]) -> Self {
        Self {
            names: columns.iter().map(|c| c.to_lowercase()).collect(),
        }
    }

    fn get<'a>(&self, row: &'a [JsonValue], name: &str) -> Option<&'a JsonValue> {
        let idx = self.names.iter().position(|n| n == name)?;
        row.get(idx)
    }

    fn text(&self, row: &[JsonValue], name: &str) -> String {
        match self.get(row, name) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn number(&self, row: &[JsonValue], name: &str) -> u32 {
        self.get(row, name)
            .and_then(value_as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or_default()
    }
}

/// Reads a non-negative integer from a JSON number or numeric string.
fn value_as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
