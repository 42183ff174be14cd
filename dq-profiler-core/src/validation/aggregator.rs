//! Merges validation outcomes into the column profile report.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::models::ValidationOutcome;
use crate::models::{ColumnDescriptor, ColumnKey, ColumnProfile};

/// Profile report with single-column validations merged in, plus the
/// multi-column outcomes in long form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedReport {
    pub profile: Vec<ColumnProfile>,
    pub multi_column: Vec<ValidationOutcome>,
}

/// Splits outcomes into single- and multi-column ones and outer-merges the
/// single-column results onto `report`.
///
/// Single-column outcomes are keyed by rule id, so a rule bound through a
/// named variable still yields one field however many columns it matched.
/// Every profile row receives one `validations` entry per such rule, null
/// where the rule did not apply. Outcomes for columns missing from `report`
/// add a new row carrying only the column identity.
pub fn aggregate(report: Vec<ColumnProfile>, outcomes: Vec<ValidationOutcome>) -> AggregatedReport {
    let (single, multi_column): (Vec<_>, Vec<_>) =
        outcomes.into_iter().partition(ValidationOutcome::is_single_column);

    let mut rule_ids: Vec<String> = Vec::new();
    for outcome in &single {
        if !rule_ids.contains(&outcome.rule_id) {
            rule_ids.push(outcome.rule_id.clone());
        }
    }

    let mut profile = report;
    let mut index: HashMap<ColumnKey, usize> = profile
        .iter()
        .enumerate()
        .map(|(i, p)| (p.key(), i))
        .collect();

    for outcome in single {
        let Some(column) = outcome.combination.columns().next() else {
            continue;
        };
        let key = outcome.table_ref().column(column);
        let position = match index.get(&key) {
            Some(&position) => position,
            None => {
                profile.push(ColumnProfile::new(ColumnDescriptor::from_key(&key)));
                index.insert(key, profile.len() - 1);
                profile.len() - 1
            }
        };
        profile[position]
            .validations
            .insert(outcome.rule_id, outcome.result.unwrap_or(JsonValue::Null));
    }

    for row in &mut profile {
        for rule_id in &rule_ids {
            row.validations
                .entry(rule_id.clone())
                .or_insert(JsonValue::Null);
        }
    }

    AggregatedReport {
        profile,
        multi_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SemanticType, TableRef};
    use crate::validation::models::Combination;
    use serde_json::json;

    fn profile(column: &str) -> ColumnProfile {
        ColumnProfile::new(ColumnDescriptor {
            database: "main".to_string(),
            schema: "main".to_string(),
            table: "PEOPLE".to_string(),
            table_type: "TABLE".to_string(),
            column_name: column.to_string(),
            ordinal: 0,
            native_type: "TEXT".to_string(),
            semantic_type: Some(SemanticType::String),
        })
    }

    fn outcome(
        label: &str,
        pairs: &[(&str, &str)],
        result: Option<JsonValue>,
    ) -> ValidationOutcome {
        ValidationOutcome {
            database: "main".to_string(),
            schema: "main".to_string(),
            table: "PEOPLE".to_string(),
            rule_id: label.split('[').next().unwrap_or(label).to_string(),
            label: label.to_string(),
            combination: Combination {
                assignments: pairs
                    .iter()
                    .map(|(v, c)| ((*v).to_string(), (*c).to_string()))
                    .collect(),
            },
            result,
        }
    }

    #[test]
    fn test_single_column_outcomes_are_merged() {
        let report = vec![profile("NAME"), profile("CITY")];
        let outcomes = vec![
            outcome("nulls.sql", &[("coluna", "NAME")], Some(json!(0))),
            outcome("nulls.sql", &[("coluna", "CITY")], Some(json!(3))),
            outcome("len.sql[NAME]", &[("col", "NAME")], None),
        ];

        let merged = aggregate(report, outcomes);
        assert!(merged.multi_column.is_empty());
        assert_eq!(merged.profile.len(), 2);

        let name = &merged.profile[0].validations;
        assert_eq!(name["nulls.sql"], json!(0));
        assert_eq!(name["len.sql"], json!(null));

        let city = &merged.profile[1].validations;
        assert_eq!(city["nulls.sql"], json!(3));
        assert!(city.contains_key("len.sql"));
        assert_eq!(city["len.sql"], json!(null));
    }

    #[test]
    fn test_named_variable_rule_yields_one_field_per_rule() {
        let report = vec![profile("NAME"), profile("CITY"), profile("ZIP")];
        let outcomes = vec![
            outcome("len.sql[NAME]", &[("col", "NAME")], Some(json!(4))),
            outcome("len.sql[CITY]", &[("col", "CITY")], Some(json!(9))),
        ];

        let merged = aggregate(report, outcomes);
        for row in &merged.profile {
            let keys: Vec<&str> = row.validations.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["len.sql"]);
        }
        assert_eq!(merged.profile[0].validations["len.sql"], json!(4));
        assert_eq!(merged.profile[1].validations["len.sql"], json!(9));
        assert_eq!(merged.profile[2].validations["len.sql"], json!(null));
    }

    #[test]
    fn test_multi_column_outcomes_stay_long_form() {
        let outcomes = vec![
            outcome("pairs.sql[NAME,CITY]", &[("a", "NAME"), ("b", "CITY")], Some(json!(1))),
            outcome("nulls.sql", &[("coluna", "NAME")], Some(json!(0))),
        ];

        let merged = aggregate(vec![profile("NAME")], outcomes);
        assert_eq!(merged.multi_column.len(), 1);
        assert_eq!(merged.multi_column[0].label, "pairs.sql[NAME,CITY]");
        assert!(!merged.profile[0].validations.contains_key("pairs.sql[NAME,CITY]"));
    }

    #[test]
    fn test_unmatched_outcome_adds_row() {
        let outcomes = vec![outcome("nulls.sql", &[("coluna", "GHOST")], Some(json!(7)))];

        let merged = aggregate(vec![profile("NAME")], outcomes);
        assert_eq!(merged.profile.len(), 2);
        assert_eq!(merged.profile[0].validations["nulls.sql"], json!(null));

        let ghost = &merged.profile[1];
        assert_eq!(ghost.key(), TableRef::new("main", "main", "PEOPLE").column("GHOST"));
        assert_eq!(ghost.validations["nulls.sql"], json!(7));
        assert!(ghost.metrics.is_empty());
    }
}
