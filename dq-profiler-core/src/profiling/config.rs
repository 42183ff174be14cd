//! Profiling configuration.

use serde::{Deserialize, Serialize};

use crate::adapters::SamplingConfig;

/// What to do when an analyzer returns the wrong number of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArityPolicy {
    /// Abort profiling with an `AnalyzerContract` error
    Strict,
    /// Log a warning and report nulls for that analyzer
    Lenient,
}

impl Default for ArityPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// Configuration for a profiling pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Sample size and the row filter the environment was opened with
    pub sampling: SamplingConfig,
    /// Handling of analyzer output arity violations
    pub arity_policy: ArityPolicy,
}

impl ProfilerConfig {
    /// Creates a profiler config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the sampling configuration.
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Builder method to set the arity policy.
    pub fn with_arity_policy(mut self, policy: ArityPolicy) -> Self {
        self.arity_policy = policy;
        self
    }
}
