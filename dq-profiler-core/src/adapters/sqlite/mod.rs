//! SQLite data source.
//!
//! # Module Structure
//! - `connection`: Connection string parsing and pool creation
//! - `rows`: Conversion of SQLite rows into JSON values
//!
//! # SQLite-Specific Features
//! - Supports both file-based and in-memory databases
//! - Single pooled connection, never reaped while idle, so in-memory
//!   databases survive for the lifetime of the source
//!
//! # Security Guarantees
//! - File databases are opened read-only unless configured otherwise
//! - No network access required

pub mod connection;
mod rows;


use super::{ConnectionConfig, DataSource, Dialect, QueryResult};
use super::dialect::SqliteDialect;
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// SQLite-backed [`DataSource`].
pub struct SqliteSource {
    /// Connection pool (single connection for SQLite)
    pub pool: SqlitePool,
    /// Connection configuration
    pub config: ConnectionConfig,
    /// Original connection string
    pub connection_string: String,
    dialect: SqliteDialect,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("config", &self.config)
            .field("is_in_memory", &self.is_in_memory())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(crate::error::DqProfilerError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(crate::error::DqProfilerError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        // Column discovery reads sqlite_master
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sqlite_master")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                crate::error::DqProfilerError::query_failed("Cannot access sqlite_master", e)
            })?;

        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult> {
        tracing::trace!("sqlite query: {}", sql);

        let rows = sqlx::query(sql).fetch_all(&self.pool).await.map_err(|e| {
            crate::error::DqProfilerError::query_failed(
                format!("SQLite query failed: {}", first_line(sql)),
                e,
            )
        })?;

        Ok(rows::rows_to_result(&rows))
    }
}

/// First non-blank line of a statement, for error context.
fn first_line(sql: &str) -> &str {
    sql.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}
