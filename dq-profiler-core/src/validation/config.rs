//! Validation engine configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory scanned for rule files.
pub const DEFAULT_RULES_DIR: &str = "validacao";

/// Default maximum number of column combinations per rule and table.
pub const DEFAULT_MAX_COMBINATIONS: usize = 16;

/// Configuration for loading and running validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Directory holding rule files
    pub rules_dir: PathBuf,
    /// Extension (without dot) that marks a file as a rule
    pub rule_extension: String,
    /// Rules expanding to more combinations than this are skipped
    pub max_combinations: usize,
    /// Variable bound by directives without a bracketed name
    pub default_variable: String,
    /// Placeholder receiving the filtered table expression
    pub table_placeholder: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from(DEFAULT_RULES_DIR),
            rule_extension: "sql".to_string(),
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            default_variable: "coluna".to_string(),
            table_placeholder: "tabela".to_string(),
        }
    }
}

impl ValidationConfig {
    /// Creates a validation config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the rules directory.
    pub fn with_rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rules_dir = dir.into();
        self
    }

    /// Builder method to set the combination guard.
    pub fn with_max_combinations(mut self, max: usize) -> Self {
        self.max_combinations = max;
        self
    }
}
