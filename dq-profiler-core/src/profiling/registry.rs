//! Ordered registry of column analyzers.
//!
//! The registry is an ordinary value: it is built once at startup by
//! [`AnalyzerRegistry::with_builtins`] (or by hand in tests) and passed to
//! the profiler. Registration order fixes the order of the output fields in
//! the report.

use serde_json::Value as JsonValue;

use super::config::ArityPolicy;
use crate::Result;
use crate::error::DqProfilerError;
use crate::models::SemanticType;

/// Analyzer function: `(column_name, semantic_type, sampled values)`.
///
/// Returns one value per declared output, or `None` when the analysis does
/// not apply; `None` is reported as nulls.
pub type AnalyzerFn = fn(&str, Option<SemanticType>, &[JsonValue]) -> Option<Vec<JsonValue>>;

/// A registered analyzer and the names of the fields it produces.
#[derive(Debug, Clone)]
pub struct Analyzer {
    name: String,
    outputs: Vec<String>,
    function: AnalyzerFn,
}

impl Analyzer {
    /// Analyzer name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output field names, in tuple order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// A tuple of nulls with this analyzer's arity.
    pub fn nulls(&self) -> Vec<JsonValue> {
        vec![JsonValue::Null; self.outputs.len()]
    }

    /// Runs the analyzer and enforces its output arity.
    ///
    /// # Errors
    /// Returns `AnalyzerContract` when the arity is wrong and `policy` is
    /// [`ArityPolicy::Strict`]
    pub fn run(
        &self,
        column: &str,
        semantic_type: Option<SemanticType>,
        values: &[JsonValue],
        policy: ArityPolicy,
    ) -> Result<Vec<JsonValue>> {
        let Some(output) = (self.function)(column, semantic_type, values) else {
            return Ok(self.nulls());
        };

        if output.len() == self.outputs.len() {
            return Ok(output);
        }

        let violation = DqProfilerError::AnalyzerContract {
            analyzer: self.name.clone(),
            column: column.to_string(),
            expected: self.outputs.len(),
            actual: output.len(),
        };
        match policy {
            ArityPolicy::Strict => Err(violation),
            ArityPolicy::Lenient => {
                tracing::warn!("{}", violation);
                Ok(self.nulls())
            }
        }
    }
}

/// Ordered collection of analyzers.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Analyzer>,
}

impl AnalyzerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in analyzer.
    ///
    /// # Errors
    /// Never fails for the built-in set; see [`Self::register`]
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        super::analyzers::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Appends an analyzer.
    ///
    /// # Errors
    /// Returns a configuration error when `outputs` is empty or reuses a
    /// field name already produced by another analyzer
    pub fn register(
        &mut self,
        name: impl Into<String>,
        outputs: &[&str],
        function: AnalyzerFn,
    ) -> Result<()> {
        let name = name.into();
        if outputs.is_empty() {
            return Err(DqProfilerError::configuration(format!(
                "Analyzer '{}' declares no output fields",
                name
            )));
        }

        if let Some(clash) = outputs
            .iter()
            .find(|o| self.output_names().any(|existing| existing == **o))
        {
            return Err(DqProfilerError::configuration(format!(
                "Analyzer '{}' output '{}' is already registered",
                name, clash
            )));
        }

        self.analyzers.push(Analyzer {
            name,
            outputs: outputs.iter().map(|o| (*o).to_string()).collect(),
            function,
        });
        Ok(())
    }

    /// Every analyzer, in registration order.
    pub fn all(&self) -> &[Analyzer] {
        &self.analyzers
    }

    /// Every output field name, in report order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.analyzers
            .iter()
            .flat_map(|a| a.outputs.iter().map(String::as_str))
    }

    /// Number of registered analyzers.
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// Whether no analyzer is registered.
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_values(_: &str, _: Option<SemanticType>, _: &[JsonValue]) -> Option<Vec<JsonValue>> {
        Some(vec![json!(1), json!(2)])
    }

    fn not_applicable(_: &str, _: Option<SemanticType>, _: &[JsonValue]) -> Option<Vec<JsonValue>> {
        None
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = AnalyzerRegistry::new();
        registry.register("first", &["a", "b"], two_values).unwrap();
        registry.register("second", &["c"], not_applicable).unwrap();

        let names: Vec<&str> = registry.all().iter().map(Analyzer::name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(registry.output_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_output_is_rejected() {
        let mut registry = AnalyzerRegistry::new();
        registry.register("first", &["a"], not_applicable).unwrap();
        assert!(registry.register("second", &["a"], not_applicable).is_err());
        assert!(registry.register("empty", &[], not_applicable).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_none_becomes_nulls() {
        let mut registry = AnalyzerRegistry::new();
        registry.register("na", &["x", "y"], not_applicable).unwrap();

        let output = registry.all()[0]
            .run("c", None, &[], ArityPolicy::Strict)
            .unwrap();
        assert_eq!(output, vec![JsonValue::Null, JsonValue::Null]);
    }

    #[test]
    fn test_arity_violation_strict_and_lenient() {
        let mut registry = AnalyzerRegistry::new();
        registry.register("wrong", &["x", "y", "z"], two_values).unwrap();
        let analyzer = &registry.all()[0];

        let err = analyzer
            .run("col", None, &[], ArityPolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            DqProfilerError::AnalyzerContract {
                expected: 3,
                actual: 2,
                ..
            }
        ));

        let output = analyzer.run("col", None, &[], ArityPolicy::Lenient).unwrap();
        assert_eq!(output, vec![JsonValue::Null; 3]);
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = AnalyzerRegistry::with_builtins().unwrap();
        assert_eq!(registry.len(), 6);
        let outputs: Vec<&str> = registry.output_names().collect();
        assert_eq!(outputs.first(), Some(&"missing_ratio"));
        assert!(outputs.contains(&"P50"));
        assert!(outputs.contains(&"name_ratio"));
    }
}
