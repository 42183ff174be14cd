//! Validation rule data structures.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::models::TableRef;

/// One `filtro` header directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Variable name in brackets, `None` for the default variable
    pub variable: Option<String>,
    /// Column predicate; empty or `*` selects every column
    pub predicate: String,
}

impl Directive {
    /// Whether the predicate selects every column.
    pub fn selects_all(&self) -> bool {
        let predicate = self.predicate.trim();
        predicate.is_empty() || predicate == "*"
    }
}

/// A templated SQL validation query loaded from a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Source file name
    pub id: String,
    /// Header directives in file order
    pub directives: Vec<Directive>,
    /// SQL body, verbatim
    pub template: String,
}

/// Columns eligible for one rule variable on one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub variable: String,
    pub columns: Vec<String>,
}

/// One column chosen per bound variable, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Combination {
    pub assignments: Vec<(String, String)>,
}

impl Combination {
    /// Column bound to `variable`.
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, c)| c.as_str())
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Bound column names in binding order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(_, c)| c.as_str())
    }
}

impl Serialize for Combination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.assignments.len()))?;
        for (variable, column) in &self.assignments {
            map.serialize_entry(variable, column)?;
        }
        map.end()
    }
}

/// Scalar result of one rule run against one combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub rule_id: String,
    pub label: String,
    pub combination: Combination,
    /// First value of the first row; `None` when the query failed or
    /// returned no rows
    pub result: Option<JsonValue>,
}

impl ValidationOutcome {
    /// Table the outcome belongs to.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.database, &self.schema, &self.table)
    }

    /// Whether the outcome characterizes a single column.
    pub fn is_single_column(&self) -> bool {
        self.combination.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_selects_all() {
        let all = Directive {
            variable: None,
            predicate: " * ".to_string(),
        };
        let empty = Directive {
            variable: None,
            predicate: String::new(),
        };
        let typed = Directive {
            variable: Some("col".to_string()),
            predicate: "semantic_type == 'STRING'".to_string(),
        };
        assert!(all.selects_all());
        assert!(empty.selects_all());
        assert!(!typed.selects_all());
    }

    #[test]
    fn test_combination_serializes_as_ordered_map() {
        let combination = Combination {
            assignments: vec![
                ("z".to_string(), "last_name".to_string()),
                ("a".to_string(), "first_name".to_string()),
            ],
        };
        assert_eq!(
            serde_json::to_string(&combination).unwrap(),
            r#"{"z":"last_name","a":"first_name"}"#
        );
        assert_eq!(combination.get("a"), Some("first_name"));
        assert_eq!(combination.columns().collect::<Vec<_>>(), vec!["last_name", "first_name"]);
    }
}
