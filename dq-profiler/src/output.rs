//! Report document assembly and file output.

use std::path::Path;

use chrono::{DateTime, Utc};
use dq_profiler_core::error::DqProfilerError;
use dq_profiler_core::{
    AggregatedReport, ColumnDescriptor, ColumnProfile, Result, TableDescriptor, ValidationOutcome,
};
use serde::Serialize;

/// Default report path.
pub const DEFAULT_OUTPUT: &str = "dicionario.json";

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub tables: Vec<TableDescriptor>,
    pub columns: Vec<ColumnDescriptor>,
    /// One row per column with analyzer outputs and single-column validations
    pub profile: Vec<ColumnProfile>,
    pub multi_column_validations: Vec<ValidationOutcome>,
}

impl ReportDocument {
    /// Builds a report stamped with the current time.
    pub fn new(
        tables: Vec<TableDescriptor>,
        columns: Vec<ColumnDescriptor>,
        aggregated: AggregatedReport,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            tables,
            columns,
            profile: aggregated.profile,
            multi_column_validations: aggregated.multi_column,
        }
    }
}

/// Writes the report as pretty-printed JSON.
///
/// # Errors
/// Returns error if serialization or the file write fails
pub async fn save_report(report: &ReportDocument, output_path: &Path) -> Result<()> {
    let json_data =
        serde_json::to_string_pretty(report).map_err(|e| DqProfilerError::Serialization {
            context: "Report serialization".to_string(),
            source: e,
        })?;

    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| DqProfilerError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_profiler_core::{RowCount, SemanticType};
    use serde_json::json;

    fn column() -> ColumnDescriptor {
        ColumnDescriptor {
            database: String::new(),
            schema: String::new(),
            table: "people".to_string(),
            table_type: "TABLE".to_string(),
            column_name: "name".to_string(),
            ordinal: 1,
            native_type: "TEXT".to_string(),
            semantic_type: Some(SemanticType::String),
        }
    }

    fn report() -> ReportDocument {
        let table = TableDescriptor {
            database: String::new(),
            schema: String::new(),
            table: "people".to_string(),
            table_type: "TABLE".to_string(),
            column_count: 1,
            row_count: RowCount::Unknown,
            filter: None,
        };
        let mut profile = ColumnProfile::new(column());
        profile.validations.insert("nulls.sql".to_string(), json!(3));

        ReportDocument::new(
            vec![table],
            vec![column()],
            AggregatedReport {
                profile: vec![profile],
                multi_column: Vec::new(),
            },
        )
    }

    #[test]
    fn test_report_shape() {
        let value = serde_json::to_value(report()).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["tables"][0]["row_count"], json!(null));
        assert_eq!(value["columns"][0]["semantic_type"], json!("STRING"));
        assert_eq!(value["profile"][0]["validations"]["nulls.sql"], json!(3));
        assert_eq!(value["multi_column_validations"], json!([]));
    }

    #[tokio::test]
    async fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT);

        save_report(&report(), &path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["profile"][0]["column_name"], json!("name"));
    }

    #[tokio::test]
    async fn test_save_report_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(DEFAULT_OUTPUT);
        let err = save_report(&report(), &path).await.unwrap_err();
        assert!(matches!(err, DqProfilerError::Io { .. }));
    }
}
