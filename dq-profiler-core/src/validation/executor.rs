//! Runs validation rules against profiled tables.

use std::collections::BTreeMap;

use super::binder::bind;
use super::config::ValidationConfig;
use super::expander::{Expansion, expand};
use super::models::{Combination, ValidationOutcome, ValidationRule};
use crate::Result;
use crate::adapters::Environment;
use crate::error::DqProfilerError;
use crate::models::{ColumnProfile, TableRef};

/// Label under which an outcome is reported.
///
/// Columns bound to the default variable are left out. With no remaining
/// columns the label is the bare rule id, otherwise the remaining columns are
/// listed in brackets: `rule.sql[a,b]`.
pub fn label(rule_id: &str, combination: &Combination, default_variable: &str) -> String {
    let extra: Vec<&str> = combination
        .assignments
        .iter()
        .filter(|(variable, _)| variable != default_variable)
        .map(|(_, column)| column.as_str())
        .collect();

    if extra.is_empty() {
        rule_id.to_string()
    } else {
        format!("{}[{}]", rule_id, extra.join(","))
    }
}

/// Runs every rule against every profiled table.
///
/// Tables are taken from `report` in (database, schema, table) order, so
/// tables skipped during profiling are skipped here too. Rules whose bindings
/// are empty or exceed the combination guard are logged and skipped for that
/// table. A failing query yields an outcome with no result.
pub async fn run_validations(
    env: &Environment,
    rules: &[ValidationRule],
    report: &[ColumnProfile],
    config: &ValidationConfig,
) -> Vec<ValidationOutcome> {
    let mut tables: BTreeMap<TableRef, Vec<&ColumnProfile>> = BTreeMap::new();
    for profile in report {
        tables
            .entry(profile.column.table_ref())
            .or_default()
            .push(profile);
    }

    let mut outcomes = Vec::new();
    for (table, columns) in &tables {
        tracing::info!("Validating {} ({} columns)", table, columns.len());
        for rule in rules {
            outcomes.extend(run_rule(env, rule, table, columns, config).await);
        }
    }

    tracing::info!("Collected {} validation outcomes", outcomes.len());
    outcomes
}

async fn run_rule(
    env: &Environment,
    rule: &ValidationRule,
    table: &TableRef,
    columns: &[&ColumnProfile],
    config: &ValidationConfig,
) -> Vec<ValidationOutcome> {
    let bindings = bind(rule, columns, config);

    let combinations = match expand(&bindings, config.max_combinations) {
        Expansion::Combinations(combinations) => combinations,
        Expansion::Empty => {
            tracing::warn!(
                "Skipping rule {} on {}: no column combination found",
                rule.id,
                table
            );
            return Vec::new();
        }
        Expansion::TooMany { count, limit } => {
            tracing::warn!(
                "Skipping rule {} on {}: {} combinations exceed the limit of {}",
                rule.id,
                table,
                count,
                limit
            );
            return Vec::new();
        }
    };
    tracing::info!(
        "Rule {} on {}: {} combinations",
        rule.id,
        table,
        combinations.len()
    );

    let mut outcomes = Vec::with_capacity(combinations.len());
    for combination in combinations {
        let executed =
            execute_combination(env, rule, table, columns, &combination, config).await;
        let result = match executed {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "Rule {} failed on {} for {:?}: {}",
                    rule.id,
                    table,
                    combination.assignments,
                    e
                );
                None
            }
        };

        outcomes.push(ValidationOutcome {
            database: table.database.clone(),
            schema: table.schema.clone(),
            table: table.table.clone(),
            rule_id: rule.id.clone(),
            label: label(&rule.id, &combination, &config.default_variable),
            combination,
            result,
        });
    }
    outcomes
}

async fn execute_combination(
    env: &Environment,
    rule: &ValidationRule,
    table: &TableRef,
    columns: &[&ColumnProfile],
    combination: &Combination,
    config: &ValidationConfig,
) -> Result<Option<serde_json::Value>> {
    let dialect = env.dialect();
    let mut substitutions = BTreeMap::new();

    for (variable, column) in &combination.assignments {
        if !columns.iter().any(|c| &c.column.column_name == column) {
            return Err(DqProfilerError::template(format!(
                "column '{column}' is not part of {table}"
            )));
        }
        substitutions.insert(variable.clone(), dialect.quote_identifier(column));
    }
    substitutions.insert(config.table_placeholder.clone(), env.table_expression(table));

    let result = env.execute(&rule.template, table, &substitutions).await?;
    Ok(result.first_value().cloned())
}
