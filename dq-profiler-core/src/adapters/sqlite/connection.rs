//! SQLite connection handling.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - In-memory: `sqlite::memory:` or `:memory:`
//! - Bare file paths ending in `.db`, `.sqlite` or `.sqlite3`

use super::{ConnectionConfig, SqliteSource};
use crate::Result;
use crate::adapters::dialect::SqliteDialect;
use sqlx::SqlitePool;
use url::Url;

impl SqliteSource {
    /// Opens a SQLite source from a connection string with default settings.
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - Database file does not exist (for file-based DBs)
    /// - Database cannot be opened
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_sqlite_connection_config(connection_string)?;
        Self::with_config(connection_string, config).await
    }

    /// Opens a SQLite source with custom configuration.
    ///
    /// # Errors
    /// Returns error if the configuration or connection string is invalid,
    /// or the database cannot be opened.
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        validate_sqlite_connection_string(connection_string)?;
        let pool = create_sqlite_connection(connection_string, &config).await?;

        tracing::debug!("Opened SQLite source {}", config);

        Ok(Self {
            pool,
            config,
            connection_string: connection_string.to_string(),
            dialect: SqliteDialect,
        })
    }

    /// Checks if the connection is to an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.connection_string.contains(":memory:")
            || self.connection_string.contains("mode=memory")
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Parses a SQLite connection string into a connection configuration.
///
/// # Errors
/// Returns error if the connection string is invalid
pub fn parse_sqlite_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
    validate_sqlite_connection_string(connection_string)?;

    let database_name = extract_database_name(connection_string);
    let mut config = ConnectionConfig::new("localhost".to_string()).with_database(database_name);

    // A read-only in-memory database is always empty
    if connection_string.contains(":memory:") || connection_string.contains("mode=memory") {
        config.read_only = false;
    }

    config.max_connections = 1;
    Ok(config)
}

/// Validates SQLite connection string format.
///
/// # Errors
/// Returns error if connection string is invalid
pub fn validate_sqlite_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == ":memory:" {
        return Ok(());
    }

    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if connection_string.contains(":memory:") || connection_string.contains("mode=memory") {
            return Ok(());
        }

        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(crate::error::DqProfilerError::configuration(
                    "Connection string must use sqlite:// scheme",
                ));
            }
            return Ok(());
        }

        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(crate::error::DqProfilerError::configuration(
        "Invalid SQLite connection string format: expected sqlite:// URL, file path, or :memory:",
    ))
}

/// Extracts database name from connection string.
fn extract_database_name(connection_string: &str) -> String {
    if connection_string.contains(":memory:") {
        return ":memory:".to_string();
    }

    if let Some(stripped) = connection_string.strip_prefix("sqlite://") {
        let path = stripped.split('?').next().unwrap_or(stripped);
        if let Some(filename) = path.rsplit('/').next()
            && !filename.is_empty()
        {
            return filename.to_string();
        }
    }

    if let Some(filename) = connection_string.rsplit('/').next()
        && !filename.is_empty()
    {
        return filename.to_string();
    }

    "main".to_string()
}

/// Creates a SQLite connection pool.
async fn create_sqlite_connection(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<SqlitePool> {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    let normalized = normalize_connection_string(connection_string);

    let mut options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
        crate::error::DqProfilerError::configuration(format!(
            "Invalid SQLite connection string: {}",
            e
        ))
    })?;

    if config.read_only {
        options = options.read_only(true);
    }

    // One connection that is never reaped, so in-memory data is kept
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect_with(options)
        .await
        .map_err(crate::error::DqProfilerError::connection_failed)?;

    Ok(pool)
}

/// Normalizes connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sqlite_connection_string_memory() {
        assert!(validate_sqlite_connection_string(":memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite::memory:").is_ok());
        assert!(validate_sqlite_connection_string("sqlite://:memory:").is_ok());
    }

    #[test]
    fn test_validate_sqlite_connection_string_file() {
        assert!(validate_sqlite_connection_string("sqlite:///path/to/db.sqlite").is_ok());
        assert!(validate_sqlite_connection_string("sqlite://./test.db").is_ok());
        assert!(validate_sqlite_connection_string("/path/to/database.db").is_ok());
        assert!(validate_sqlite_connection_string("data.sqlite3").is_ok());
    }

    #[test]
    fn test_validate_sqlite_connection_string_invalid() {
        assert!(validate_sqlite_connection_string("mssql://localhost/db").is_err());
        assert!(validate_sqlite_connection_string("invalid").is_err());
    }

    #[test]
    fn test_extract_database_name() {
        assert_eq!(extract_database_name(":memory:"), ":memory:");
        assert_eq!(
            extract_database_name("sqlite:///path/to/mydb.sqlite"),
            "mydb.sqlite"
        );
        assert_eq!(extract_database_name("sqlite://./test.db"), "test.db");
        assert_eq!(extract_database_name("/var/data/app.db"), "app.db");
    }

    #[test]
    fn test_normalize_connection_string() {
        assert_eq!(normalize_connection_string(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_connection_string("/path/to/db.sqlite"),
            "sqlite:///path/to/db.sqlite"
        );
    }

    #[test]
    fn test_parse_sqlite_connection_config() {
        let config = parse_sqlite_connection_config("sqlite:///path/to/test.db").unwrap();
        assert_eq!(config.database, Some("test.db".to_string()));
        assert_eq!(config.max_connections, 1);
        assert!(config.read_only);

        let config = parse_sqlite_connection_config(":memory:").unwrap();
        assert_eq!(config.database, Some(":memory:".to_string()));
        assert!(!config.read_only);
    }
}
