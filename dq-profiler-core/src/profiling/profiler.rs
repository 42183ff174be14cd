//! Per-table sampling and analysis loop.

use super::config::ProfilerConfig;
use super::registry::AnalyzerRegistry;
use crate::Result;
use crate::adapters::Environment;
use crate::models::{ColumnProfile, TableDescriptor};

/// Profiles every table of the environment whose row count is known.
///
/// For each table one sample of its non-BLOB columns is drawn, and every
/// registered analyzer runs over every sampled column. Each column of the
/// table yields one [`ColumnProfile`]; columns absent from the sample (BLOBs)
/// carry nulls for every analyzer output.
///
/// Tables with an unknown row count, or whose sample query fails, are logged
/// and skipped.
///
/// # Errors
/// Returns error if column discovery fails, or if an analyzer breaks its
/// output arity under [`super::ArityPolicy::Strict`]
pub async fn profile(
    env: &Environment,
    registry: &AnalyzerRegistry,
    config: &ProfilerConfig,
) -> Result<Vec<ColumnProfile>> {
    let mut report = Vec::new();

    for table in env.tables().await? {
        match profile_table(env, registry, config, table).await? {
            Some(profiles) => report.extend(profiles),
            None => continue,
        }
    }

    tracing::info!("Profiled {} columns", report.len());
    Ok(report)
}

async fn profile_table(
    env: &Environment,
    registry: &AnalyzerRegistry,
    config: &ProfilerConfig,
    table: &TableDescriptor,
) -> Result<Option<Vec<ColumnProfile>>> {
    let table_ref = table.table_ref();
    let Some(row_count) = table.row_count.known() else {
        tracing::warn!("Skipping {}: row count unknown", table_ref);
        return Ok(None);
    };

    let columns = env.table_columns(&table_ref).await?;
    let selected: Vec<String> = columns
        .iter()
        .filter(|c| !c.is_blob())
        .map(|c| c.column_name.clone())
        .collect();

    tracing::info!("Sampling {} ({} rows)", table_ref, row_count);
    let sample = match env
        .sample(&table_ref, &selected, row_count, config.sampling.sample_size)
        .await
    {
        Ok(sample) => sample,
        Err(e) => {
            tracing::warn!("Skipping {}: sample failed: {}", table_ref, e);
            return Ok(None);
        }
    };
    tracing::debug!("Sampled {} rows from {}", sample.len(), table_ref);

    let distinct_rows = sample.distinct_rows();
    let mut profiles = Vec::with_capacity(columns.len());

    for column in columns {
        let mut profile = ColumnProfile::new(column.clone());
        profile.row_count = Some(row_count);
        profile.sample_size_actual = Some(sample.len());
        profile.distinct_sample_rows = Some(distinct_rows);
        profile.applied_filter = env.filter().map(str::to_string);

        let values = sample.column(&column.column_name);
        for analyzer in registry.all() {
            let output = match values.as_deref() {
                Some(values) => analyzer.run(
                    &column.column_name,
                    column.semantic_type,
                    values,
                    config.arity_policy,
                )?,
                None => analyzer.nulls(),
            };

            for (name, value) in analyzer.outputs().iter().zip(output) {
                profile.metrics.insert(name.clone(), value);
            }
        }

        profiles.push(profile);
    }

    Ok(Some(profiles))
}
