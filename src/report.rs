//! Structured output for findings.
//!
//! The engine emits [`Finding`] records only; rendering, severity
//! configuration and suppression are host concerns. This module provides
//! the one output surface the crate owns: a JSON envelope for programmatic
//! consumption, with messages pre-rendered from the rule descriptors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detect::{descriptor, Finding};
use crate::syntax::Span;

/// JSON report envelope.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub count: usize,
    pub findings: Vec<JsonFinding>,
}

/// One finding, with its message rendered.
#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub severity: String,
    pub span: Span,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub properties: std::collections::BTreeMap<String, String>,
}

fn finding_to_json(finding: &Finding) -> JsonFinding {
    let descriptor = descriptor(finding.rule);
    JsonFinding {
        rule: finding.rule.to_string(),
        severity: descriptor.default_severity.to_string(),
        span: finding.span,
        message: descriptor.render(&finding.message_args),
        properties: finding.properties.clone(),
    }
}

/// Build the report envelope for a finding set.
pub fn build_report(findings: &[Finding]) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        count: findings.len(),
        findings: findings.iter().map(finding_to_json).collect(),
    }
}

/// Serialize findings to pretty JSON.
pub fn to_json(findings: &[Finding]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&build_report(findings))?)
}

/// Write the JSON report to a file.
pub fn write_json_file<P: AsRef<Path>>(path: P, findings: &[Finding]) -> anyhow::Result<()> {
    let json = to_json(findings)?;
    std::fs::write(path, json)?;
    Ok(())
}
