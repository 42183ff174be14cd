//! Data sampling configuration.

use serde::{Deserialize, Serialize};

/// Default number of rows drawn per table.
pub const DEFAULT_SAMPLE_SIZE: u64 = 10_000;

/// Configuration for data sampling.
///
/// The row filter is not part of sampling: it belongs to the
/// [`Environment`](crate::adapters::Environment), which applies it to every
/// count, sample, and rule query alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Maximum number of rows to sample per table
    pub sample_size: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl SamplingConfig {
    /// Creates a new sampling config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set sample size.
    pub fn with_sample_size(mut self, size: u64) -> Self {
        self.sample_size = size;
        self
    }
}
