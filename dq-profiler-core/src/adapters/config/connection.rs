//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for database connections.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
///
/// # Example
/// ```rust
/// use dq_profiler_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_database("sales.db".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Optional database name
    pub database: Option<String>,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum number of connections in pool
    pub max_connections: u32,
    /// Whether to enforce read-only mode
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            database: None,
            connect_timeout: Duration::from_secs(30),
            max_connections: 1,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{})",
            self.host,
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::DqProfilerError::configuration(
                "host cannot be empty",
            ));
        }

        if self.max_connections == 0 {
            return Err(crate::error::DqProfilerError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(crate::error::DqProfilerError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Creates a new connection config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to toggle read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
