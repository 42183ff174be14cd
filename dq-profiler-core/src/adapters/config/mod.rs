//! Configuration types for data sources.
//!
//! - `ConnectionConfig`: connection settings (never credentials)
//! - `SamplingConfig`: sample size
//! - `EnvironmentScope`: which database, schema and tables are discovered

mod connection;
mod sampling;
mod scope;

pub use connection::ConnectionConfig;
pub use sampling::{DEFAULT_SAMPLE_SIZE, SamplingConfig};
pub use scope::EnvironmentScope;
