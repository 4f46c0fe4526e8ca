use crate::SeverityCounts;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for the machine-readable report summary.
pub const SCHEMA_SUMMARY_V1: &str = "scanforge.summary.v1";

/// A non-fatal pipeline diagnostic: something was skipped, tie-broken or
/// left out, and the operator should be able to see it afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Total findings for one scan target, feeding the per-target bar chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TargetCount {
    pub target: String,
    pub counts: SeverityCounts,
}

impl TargetCount {
    pub fn total(&self) -> u32 {
        self.counts.total()
    }
}

/// Outcome of the two-pass external compilation.
///
/// A classified failure is data, not an error: the pipeline finished, the
/// compiler did not. Exit-code success is necessary but not sufficient for
/// `succeeded` (the artifact must also exist).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompilationResult {
    pub pass_count: u32,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    pub diagnostic_message: String,
}

/// The machine-readable envelope written next to the compiled document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,

    pub web_totals: SeverityCounts,
    pub infra_totals: SeverityCounts,
    pub sites_analyzed: u32,
    pub hosts_analyzed: u32,

    /// Vulnerability names with no taxonomy match, for operator follow-up.
    #[serde(default)]
    pub missing_descriptions: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation: Option<CompilationResult>,
}
