//! Rule file discovery and parsing.
//!
//! A rule file is a header of comment lines followed by a SQL body:
//!
//! ```text
//! # filtro[col]: semantic_type == 'STRING'
//! # filtro: *
//! select count(1) from {tabela} x where {col} is null
//! ```
//!
//! The header is the contiguous run of leading lines that start with `#` or
//! `--`. Header lines that are not `filtro` directives are comments.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::config::ValidationConfig;
use super::models::{Directive, ValidationRule};

const HEADER_MARKERS: [&str; 2] = ["#", "--"];

fn directive_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^(?:#|--)\s*filtro(?:\[(\w+)\])?:\s*(.*?)\s*$").ok())
        .as_ref()
}

fn is_header_line(line: &str) -> bool {
    HEADER_MARKERS.iter().any(|marker| line.starts_with(marker))
}

/// Parses one header line into a directive, if it is one.
pub fn parse_directive(line: &str) -> Option<Directive> {
    let captures = directive_pattern()?.captures(line)?;
    Some(Directive {
        variable: captures.get(1).map(|m| m.as_str().to_string()),
        predicate: captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// Splits rule file content into directives and SQL body.
pub fn parse_rule(id: impl Into<String>, content: &str) -> ValidationRule {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.split('\n').collect();
    let header_len = lines.iter().take_while(|l| is_header_line(l)).count();

    let directives = lines[..header_len]
        .iter()
        .filter_map(|line| parse_directive(line))
        .collect();

    ValidationRule {
        id: id.into(),
        directives,
        template: lines[header_len..].join("\n"),
    }
}

/// Loads every rule file of the configured directory, sorted by file name.
///
/// A missing or unreadable directory yields no rules. Files that cannot be
/// read are logged and skipped.
pub async fn load_rules(config: &ValidationConfig) -> Vec<ValidationRule> {
    let dir = config.rules_dir.as_path();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No rule directory at {}", dir.display());
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Cannot read rule directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                if path.is_file() && has_extension(&path, &config.rule_extension) {
                    paths.push(path);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Error listing rule directory {}: {}", dir.display(), e);
                break;
            }
        }
    }
    paths.sort();

    let mut rules = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let rule = parse_rule(id, &content);
                tracing::debug!(
                    "Loaded rule {} with {} directives",
                    rule.id,
                    rule.directives.len()
                );
                rules.push(rule);
            }
            Err(e) => tracing::warn!("Skipping rule file {}: {}", path.display(), e),
        }
    }

    tracing::info!("Loaded {} validation rules from {}", rules.len(), dir.display());
    rules
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}
