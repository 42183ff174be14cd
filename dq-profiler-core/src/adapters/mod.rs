//! Data source traits and factory for database access.
//!
//! A [`DataSource`] only knows how to run SQL and which [`Dialect`] it
//! speaks. Everything the profiler and the validation engine need on top of
//! that (column discovery, row counts, samples, templated execution) is built
//! once in [`Environment`], so a new backend only has to implement three
//! methods.
//!
//! # Module Structure
//! - `config`: Configuration types (ConnectionConfig, SamplingConfig, EnvironmentScope)
//! - `dialect`: Per-engine SQL generation and type mapping
//! - `environment`: Cached schema discovery and query execution
//! - Backend modules (sqlite)

use crate::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub mod config;
pub mod dialect;
pub mod environment;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConnectionConfig, DEFAULT_SAMPLE_SIZE, EnvironmentScope, SamplingConfig};
pub use dialect::{Dialect, SUPPORTED_DIALECTS, SampleRequest, dialect_for_name};
pub use environment::Environment;

/// Tabular result of one query, rows stored positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl QueryResult {
    /// Value in the first row and first column, if any.
    pub fn first_value(&self) -> Option<&JsonValue> {
        self.rows.first().and_then(|row| row.first())
    }
}

impl From<QueryResult> for crate::models::Sample {
    fn from(result: QueryResult) -> Self {
        crate::models::Sample::new(result.columns, result.rows)
    }
}

/// A connection to one database that can execute read-only SQL.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn DataSource>`.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// SQL dialect spoken by this source.
    fn dialect(&self) -> &dyn Dialect;

    /// Tests the connection without touching any user table.
    ///
    /// # Errors
    /// Returns error if the database cannot be reached
    async fn test_connection(&self) -> Result<()>;

    /// Runs one SQL statement and returns every row.
    ///
    /// # Errors
    /// Returns a `Query` error when the statement fails
    async fn query(&self, sql: &str) -> Result<QueryResult>;
}

/// Factory function to create a data source from a connection URL.
///
/// # Errors
/// Returns error if:
/// - The URL format is not recognized
/// - The dialect has no connection backend compiled in
/// - The database cannot be opened
pub async fn create_data_source(connection_string: &str) -> Result<Box<dyn DataSource>> {
    let dialect = detect_dialect(connection_string)?;

    match dialect {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let source = sqlite::SqliteSource::new(connection_string).await?;
            Ok(Box::new(source))
        }
        other => Err(crate::error::DqProfilerError::unsupported_feature(
            "connection backend",
            other,
        )),
    }
}

/// Detects the dialect name from a connection string.
///
/// # Errors
/// Returns error if the connection string format is unrecognized
pub fn detect_dialect(connection_string: &str) -> Result<&'static str> {
    let lower = connection_string.to_ascii_lowercase();
    if lower.starts_with("sqlite:")
        || lower == ":memory:"
        || lower.ends_with(".db")
        || lower.ends_with(".sqlite")
        || lower.ends_with(".sqlite3")
    {
        Ok("sqlite")
    } else if lower.starts_with("mssql") || lower.starts_with("sqlserver://") {
        Ok("mssql")
    } else if lower.starts_with("oracle") {
        Ok("oracle")
    } else {
        Err(crate::error::DqProfilerError::configuration(format!(
            "Unrecognized database connection string format: {}",
            crate::error::redact_database_url(connection_string)
        )))
    }
}
