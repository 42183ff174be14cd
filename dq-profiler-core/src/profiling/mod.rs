//! Column profiling: analyzer registry, built-in analyzers and the
//! per-table sampling loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use dq_profiler_core::profiling::{AnalyzerRegistry, ProfilerConfig, profile};
//!
//! let registry = AnalyzerRegistry::with_builtins()?;
//! let report = profile(&env, &registry, &ProfilerConfig::default()).await?;
//! ```

pub mod analyzers;
mod config;
mod profiler;
mod registry;

pub use config::{ArityPolicy, ProfilerConfig};
pub use profiler::profile;
pub use registry::{Analyzer, AnalyzerFn, AnalyzerRegistry};
