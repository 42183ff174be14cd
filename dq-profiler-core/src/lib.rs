//! Column profiling and templated SQL validation for relational tables.
//!
//! This crate samples every table of a database environment, runs a registry
//! of statistical and content analyzers over each column, and then executes
//! user-supplied SQL validation rules against the profiled tables.
//!
//! # Guarantees
//! - Connection strings are redacted before they reach logs or errors
//! - Only SELECT statements are issued against the target database
//! - A failing table or rule is logged and skipped, never aborts the run
//!
//! # Architecture
//! - [`adapters`]: data sources, SQL dialects, and the cached [`Environment`]
//! - [`profiling`]: analyzer registry and the per-table profiling loop
//! - [`validation`]: rule loading, variable binding, execution, aggregation

pub mod adapters;
pub mod error;
pub mod logging;
pub mod models;
pub mod profiling;
pub mod template;
pub mod validation;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, DataSource, Dialect, Environment, EnvironmentScope, QueryResult,
    SamplingConfig, create_data_source, dialect_for_name,
};
pub use error::{DqProfilerError, Result};
pub use models::{
    ColumnDescriptor, ColumnKey, ColumnProfile, RowCount, Sample, SemanticType, TableDescriptor,
    TableRef,
};
pub use profiling::{AnalyzerRegistry, ArityPolicy, ProfilerConfig, profile};
pub use validation::{
    AggregatedReport, ValidationConfig, ValidationOutcome, ValidationRule, aggregate, load_rules,
    run_validations,
};
