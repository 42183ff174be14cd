//! End-to-end profiling and validation against in-memory SQLite databases.
//!
//! This test suite covers:
//! - Column discovery and profiling of known tables
//! - Row filters flowing into counts, samples and rule queries
//! - Rule binding, the combination guard and outcome labels
//! - Merging single-column outcomes into the profile report
//! - Tables with unknown row counts and BLOB-only columns

#![cfg(feature = "sqlite")]
#![allow(clippy::unwrap_used)]

use dq_profiler_core::{
    AnalyzerRegistry, ColumnProfile, Environment, ProfilerConfig, Result, RowCount, SemanticType,
    ValidationConfig, aggregate, adapters::sqlite::SqliteSource, profile, run_validations,
    validation::parse_rule,
};
use serde_json::json;

/// Opens a private in-memory database and runs the setup statements.
async fn environment(statements: &[&str]) -> Environment {
    let source = SqliteSource::new(":memory:").await.unwrap();
    for statement in statements {
        sqlx::query(statement).execute(&source.pool).await.unwrap();
    }
    Environment::new(Box::new(source))
}

fn find<'a>(report: &'a [ColumnProfile], table: &str, column: &str) -> &'a ColumnProfile {
    report
        .iter()
        .find(|p| p.column.table == table && p.column.column_name == column)
        .unwrap()
}

const EVENTS: &[&str] = &[
    "CREATE TABLE events (id INTEGER, name TEXT, created DATE)",
    "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 100)
     INSERT INTO events
     SELECT n, 'event ' || (n % 7), date('2024-01-01', '+' || n || ' days') FROM seq",
];

const CONTACTS: &[&str] = &[
    "CREATE TABLE contacts (id INTEGER, email TEXT, phone TEXT)",
    "INSERT INTO contacts VALUES (1, 'a@x.com', NULL), (2, NULL, NULL), (3, 'c@x.com', '555')",
];

// =============================================================================
// Profiling
// =============================================================================

#[tokio::test]
async fn test_unique_integer_column_is_candidate_key() -> Result<()> {
    let env = environment(EVENTS).await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let config = ProfilerConfig::new()
        .with_sampling(dq_profiler_core::SamplingConfig::new().with_sample_size(100));

    let report = profile(&env, &registry, &config).await?;
    assert_eq!(report.len(), 3);

    let id = find(&report, "events", "id");
    assert_eq!(id.column.semantic_type, Some(SemanticType::Numeric));
    assert_eq!(id.row_count, Some(100));
    assert_eq!(id.sample_size_actual, Some(100));
    assert_eq!(id.metric("missing_ratio").and_then(|v| v.as_f64()), Some(0.0));
    assert_eq!(id.metric("unique_ratio").and_then(|v| v.as_f64()), Some(1.0));
    assert_eq!(id.metric("candidate_key"), Some(&json!("SIM")));
    assert_eq!(id.metric("min"), Some(&json!(1)));
    assert_eq!(id.metric("max"), Some(&json!(100)));

    let name = find(&report, "events", "name");
    assert_eq!(name.metric("candidate_key"), Some(&json!("-")));

    let created = find(&report, "events", "created");
    assert_eq!(created.column.semantic_type, Some(SemanticType::Date));

    Ok(())
}

#[tokio::test]
async fn test_every_profile_carries_every_analyzer_output() -> Result<()> {
    let env = environment(CONTACTS).await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let expected: Vec<&str> = registry.output_names().collect();
    assert_eq!(expected.len(), 16);
    for column in &report {
        for name in &expected {
            assert!(
                column.metrics.contains_key(*name),
                "{} lacks {}",
                column.column.column_name,
                name
            );
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_filter_restricts_counts_and_samples() -> Result<()> {
    let env = environment(EVENTS)
        .await
        .with_filter(Some("id <= 40".to_string()));
    let registry = AnalyzerRegistry::with_builtins()?;

    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;
    let id = find(&report, "events", "id");
    assert_eq!(id.row_count, Some(40));
    assert_eq!(id.sample_size_actual, Some(40));
    assert_eq!(id.applied_filter.as_deref(), Some("id <= 40"));
    assert_eq!(id.metric("max"), Some(&json!(40)));

    Ok(())
}

#[tokio::test]
async fn test_table_with_unknown_row_count_is_skipped() -> Result<()> {
    // `total` only exists in `orders`, so counting `notes` fails.
    let env = environment(&[
        "CREATE TABLE orders (id INTEGER, total REAL)",
        "INSERT INTO orders VALUES (1, 10.0), (2, 0.0), (3, 5.5)",
        "CREATE TABLE notes (body TEXT)",
        "INSERT INTO notes VALUES ('hello')",
    ])
    .await
    .with_filter(Some("total > 0".to_string()));
    let registry = AnalyzerRegistry::with_builtins()?;

    let tables = env.tables().await?;
    let notes = tables.iter().find(|t| t.table == "notes").unwrap();
    assert_eq!(notes.row_count, RowCount::Unknown);

    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;
    assert!(report.iter().all(|p| p.column.table == "orders"));
    assert_eq!(report.len(), 2);
    assert_eq!(find(&report, "orders", "id").row_count, Some(2));

    let rule = parse_rule(
        "rows.sql",
        "select count(1) from {tabela} x where {coluna} is not null",
    );
    let outcomes = run_validations(&env, &[rule], &report, &ValidationConfig::default()).await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.table == "orders"));
    assert!(outcomes.iter().all(|o| o.result == Some(json!(2))));

    let merged = aggregate(report, outcomes);
    assert!(merged.profile.iter().all(|p| p.column.table == "orders"));

    Ok(())
}

#[tokio::test]
async fn test_blob_column_reports_null_outputs() -> Result<()> {
    let env = environment(&[
        "CREATE TABLE files (id INTEGER, data BLOB)",
        "INSERT INTO files VALUES (1, x'00ff'), (2, NULL)",
    ])
    .await;
    let registry = AnalyzerRegistry::with_builtins()?;

    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;
    assert_eq!(report.len(), 2);

    let data = find(&report, "files", "data");
    assert_eq!(data.column.semantic_type, Some(SemanticType::Blob));
    assert_eq!(data.row_count, Some(2));
    assert_eq!(data.sample_size_actual, Some(2));
    for name in registry.output_names() {
        assert_eq!(data.metric(name), Some(&json!(null)), "{name} should be null");
    }

    let id = find(&report, "files", "id");
    assert_eq!(id.metric("max"), Some(&json!(2)));

    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_named_variable_rule_yields_one_outcome_per_string_column() -> Result<()> {
    let env = environment(CONTACTS).await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let rule = parse_rule(
        "nulls.sql",
        "# filtro[col]: semantic_type=='STRING'\nselect count(1) from {tabela} x where {col} is null",
    );
    let outcomes = run_validations(&env, &[rule], &report, &ValidationConfig::default()).await;

    let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["nulls.sql[email]", "nulls.sql[phone]"]);
    assert_eq!(outcomes[0].result, Some(json!(1)));
    assert_eq!(outcomes[1].result, Some(json!(2)));

    Ok(())
}

#[tokio::test]
async fn test_combination_guard_skips_rule() -> Result<()> {
    let env = environment(&[
        "CREATE TABLE wide (a INTEGER, b INTEGER, c INTEGER, d INTEGER, e INTEGER)",
        "INSERT INTO wide VALUES (1, 2, 3, 4, 5)",
    ])
    .await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let rule = parse_rule(
        "pairs.sql",
        "# filtro[x]: *\n# filtro[y]: *\nselect count(1) from {tabela} t where {x} = {y}",
    );
    let outcomes = run_validations(&env, &[rule], &report, &ValidationConfig::default()).await;
    assert!(outcomes.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_failing_queries_record_missing_results() -> Result<()> {
    let env = environment(CONTACTS).await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let rules = [
        parse_rule("broken.sql", "# filtro: column_name == 'id'\nselect nope from {tabela} x"),
        parse_rule(
            "unknown_placeholder.sql",
            "# filtro: column_name == 'id'\nselect {other} from {tabela} x",
        ),
        parse_rule("ok.sql", "# filtro: column_name == 'id'\nselect max({coluna}) from {tabela} x"),
    ];
    let outcomes = run_validations(&env, &rules, &report, &ValidationConfig::default()).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].result, None);
    assert_eq!(outcomes[1].result, None);
    assert_eq!(outcomes[2].label, "ok.sql");
    assert_eq!(outcomes[2].result, Some(json!(3)));

    Ok(())
}

#[tokio::test]
async fn test_validation_honours_row_filter() -> Result<()> {
    let env = environment(CONTACTS)
        .await
        .with_filter(Some("id >= 2".to_string()));
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let rule = parse_rule(
        "rows.sql",
        "# filtro: column_name == 'id'\nselect count(1) from {tabela} x",
    );
    let outcomes = run_validations(&env, &[rule], &report, &ValidationConfig::default()).await;
    assert_eq!(outcomes[0].result, Some(json!(2)));

    Ok(())
}

#[tokio::test]
async fn test_single_and_multi_column_outcomes_are_aggregated() -> Result<()> {
    let env = environment(CONTACTS).await;
    let registry = AnalyzerRegistry::with_builtins()?;
    let report = profile(&env, &registry, &ProfilerConfig::default()).await?;

    let rules = [
        parse_rule("nulls.sql", "select count(1) from {tabela} x where {coluna} is null"),
        parse_rule(
            "long.sql",
            "# filtro[col]: semantic_type == 'STRING'\n\
             select max(length({col})) from {tabela} x",
        ),
        parse_rule(
            "both_null.sql",
            "# filtro[a]: column_name == 'email'\n# filtro[b]: column_name == 'phone'\nselect count(1) from {tabela} x where {a} is null and {b} is null",
        ),
    ];
    let outcomes = run_validations(&env, &rules, &report, &ValidationConfig::default()).await;
    assert_eq!(outcomes.len(), 6);
    assert!(outcomes.iter().any(|o| o.label == "long.sql[email]"));

    let merged = aggregate(report, outcomes);
    assert_eq!(merged.profile.len(), 3);
    for row in &merged.profile {
        let keys: Vec<&str> = row.validations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nulls.sql", "long.sql"]);
    }
    assert_eq!(find(&merged.profile, "contacts", "id").validations["long.sql"], json!(null));
    assert_eq!(find(&merged.profile, "contacts", "email").validations["long.sql"], json!(7));
    assert_eq!(find(&merged.profile, "contacts", "phone").validations["long.sql"], json!(3));
    assert_eq!(find(&merged.profile, "contacts", "id").validations["nulls.sql"], json!(0));
    assert_eq!(find(&merged.profile, "contacts", "email").validations["nulls.sql"], json!(1));
    assert_eq!(find(&merged.profile, "contacts", "phone").validations["nulls.sql"], json!(2));

    assert_eq!(merged.multi_column.len(), 1);
    assert_eq!(merged.multi_column[0].label, "both_null.sql[email,phone]");
    assert_eq!(merged.multi_column[0].result, Some(json!(1)));

    Ok(())
}
