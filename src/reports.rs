//! Dependency report generation
//!
//! Renders collected dependencies as JSON, a Markdown table or a short
//! plain-text summary.

use serde::Serialize;

use crate::file_types::ManifestKind;
use crate::parsers::Dependency;

#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport<'a> {
    pub file: &'a str,
    pub kind: &'static str,
    pub total: usize,
    pub dependencies: &'a [Dependency],
}

impl<'a> DependencyReport<'a> {
    pub fn new(file: &'a str, kind: ManifestKind, dependencies: &'a [Dependency]) -> Self {
        Self {
            file,
            kind: kind.as_str(),
            total: dependencies.len(),
            dependencies,
        }
    }
}

pub fn generate_json_report(report: &DependencyReport<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn generate_markdown_report(report: &DependencyReport<'_>) -> String {
    let mut lines = vec![
        "# Dependency Report".to_string(),
        String::new(),
        format!("**File**: {}", report.file),
        format!("**Kind**: {}", report.kind),
        String::new(),
    ];

    if report.dependencies.is_empty() {
        lines.push("No dependencies found.".to_string());
        return lines.join("\n");
    }

    lines.push("| Name | Version | Line | Column |".to_string());
    lines.push("|------|---------|------|--------|".to_string());
    for dep in report.dependencies {
        let version = if dep.version.value.is_empty() {
            "-"
        } else {
            dep.version.value.as_str()
        };
        lines.push(format!(
            "| {} | {} | {} | {} |",
            dep.name.value, version, dep.version.position.line, dep.version.position.column
        ));
    }
    lines.push(String::new());
    lines.push(format!("**Total**: {}", report.total));

    lines.join("\n")
}

/// One line per dependency: `line:column name version`
pub fn generate_summary(report: &DependencyReport<'_>) -> String {
    let mut lines = vec![format!(
        "{} dependencies in {} ({})",
        report.total, report.file, report.kind
    )];
    for dep in report.dependencies {
        lines.push(format!(
            "  {}:{}  {} {}",
            dep.version.position.line, dep.version.position.column, dep.name.value, dep.version.value
        ));
    }
    lines.join("\n")
}
