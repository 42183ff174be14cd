//! Templated SQL validation rules.
//!
//! Rule files in a directory are parsed into [`ValidationRule`]s. For every
//! profiled table, each rule's `filtro` directives bind variables to columns,
//! the bindings are expanded into column combinations, and the rule's SQL
//! template is executed once per combination. Single-column outcomes are
//! merged into the profile report; multi-column outcomes are kept apart.
//!
//! # Example
//!
//! ```rust,ignore
//! use dq_profiler_core::validation::{ValidationConfig, aggregate, load_rules, run_validations};
//!
//! let config = ValidationConfig::new().with_rules_dir("validacao");
//! let rules = load_rules(&config).await;
//! let outcomes = run_validations(&env, &rules, &report, &config).await;
//! let merged = aggregate(report, outcomes);
//! ```

mod aggregator;
mod binder;
mod config;
mod executor;
mod expander;
mod loader;
mod models;
mod predicate;

pub use aggregator::{AggregatedReport, aggregate};
pub use binder::bind;
pub use config::{DEFAULT_MAX_COMBINATIONS, DEFAULT_RULES_DIR, ValidationConfig};
pub use executor::{label, run_validations};
pub use expander::{Expansion, combination_count, expand};
pub use loader::{load_rules, parse_directive, parse_rule};
pub use models::{Combination, Directive, ValidationOutcome, ValidationRule, VariableBinding};
pub use predicate::{Predicate, Value as PredicateValue};
