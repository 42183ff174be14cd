//! Discovery scope: which part of a database an environment looks at.

use serde::{Deserialize, Serialize};

/// Restricts schema discovery to a database, a schema and a table list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentScope {
    /// Database (or Oracle owner) passed to the column listing query
    pub database: Option<String>,
    /// Only columns whose schema equals this value are kept
    pub schema: Option<String>,
    /// Only columns of these tables are kept (empty keeps all)
    pub tables: Vec<String>,
}

impl EnvironmentScope {
    /// Creates an unrestricted scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Builder method to set the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method to set the table list.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a discovered column of `schema`.`table` is inside the scope.
    pub fn includes(&self, schema: &str, table: &str) -> bool {
        if let Some(ref wanted) = self.schema
            && wanted != schema
        {
            return false;
        }
        self.tables.is_empty() || self.tables.iter().any(|t| t == table)
    }
}
