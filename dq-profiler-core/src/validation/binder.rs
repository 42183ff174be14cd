//! Binds rule variables to the columns of one table.

use super::config::ValidationConfig;
use super::models::{Directive, ValidationRule, VariableBinding};
use super::predicate::Predicate;
use crate::Result;
use crate::models::ColumnProfile;

/// Evaluates every directive of `rule` against the columns of one table.
///
/// Directives are processed in header order. A directive whose predicate
/// fails to parse or evaluate is logged and skipped; the remaining directives
/// still bind. A variable already bound by an earlier directive is renamed
/// with the first free `_1`, `_2`, ... suffix. A rule without directives
/// binds the default variable to every column.
pub fn bind(
    rule: &ValidationRule,
    columns: &[&ColumnProfile],
    config: &ValidationConfig,
) -> Vec<VariableBinding> {
    if rule.directives.is_empty() {
        return vec![VariableBinding {
            variable: config.default_variable.clone(),
            columns: column_names(columns.iter().copied()),
        }];
    }

    let mut bindings: Vec<VariableBinding> = Vec::with_capacity(rule.directives.len());

    for directive in &rule.directives {
        let selected = match select_columns(directive, columns) {
            Ok(selected) => selected,
            Err(e) => {
                tracing::warn!(
                    "Skipping directive of rule {}: predicate '{}' failed: {}",
                    rule.id,
                    directive.predicate,
                    e
                );
                continue;
            }
        };

        let requested = directive
            .variable
            .clone()
            .unwrap_or_else(|| config.default_variable.clone());
        let variable = unique_name(&bindings, requested);
        tracing::debug!("Rule {}: {} = {:?}", rule.id, variable, selected);

        bindings.push(VariableBinding {
            variable,
            columns: selected,
        });
    }

    bindings
}

fn select_columns(directive: &Directive, columns: &[&ColumnProfile]) -> Result<Vec<String>> {
    if directive.selects_all() {
        return Ok(column_names(columns.iter().copied()));
    }

    let predicate = Predicate::parse(&directive.predicate)?;
    let mut matched = Vec::new();
    for column in columns {
        if predicate.evaluate(column)? {
            matched.push(*column);
        }
    }
    Ok(column_names(matched.into_iter()))
}

fn column_names<'a>(columns: impl Iterator<Item = &'a ColumnProfile>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for column in columns {
        let name = &column.column.column_name;
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

fn unique_name(bindings: &[VariableBinding], requested: String) -> String {
    let taken = |name: &str| bindings.iter().any(|b| b.variable == name);
    if !taken(&requested) {
        return requested;
    }

    let mut suffix = 1;
    loop {
        let candidate = format!("{requested}_{suffix}");
        if !taken(&candidate) {
            tracing::debug!("Redefining variable {} as {}", requested, candidate);
            return candidate;
        }
        suffix += 1;
    }
}
