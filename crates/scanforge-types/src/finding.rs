use crate::Severity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One raw vulnerability observation from a scan export, tied to one
/// affected instance (an absolute URI for web-application scans, a host
/// identifier for infrastructure scans).
///
/// Findings are produced by extraction, consumed by aggregation, and
/// discarded afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub name: String,
    pub severity: Severity,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
}

/// Which extraction path a batch of findings came from. The two paths carry
/// different aggregate identity and different total-counting rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    WebApp,
    Infra,
}

impl ScanMode {
    /// Label used for the affected-instance lists in document text.
    pub fn instance_label(self) -> &'static str {
        match self {
            ScanMode::WebApp => "Affected URIs",
            ScanMode::Infra => "Affected Hosts",
        }
    }
}

/// Identity under which findings merge into one vulnerability record.
///
/// Web-application findings are distinguished by `(name, plugin_id)`;
/// infrastructure findings by name alone. The sum type keeps the two paths
/// exhaustively distinguished instead of relying on format sniffing.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AggregateKey {
    WebApp { name: String, plugin_id: String },
    Infra { name: String },
}

impl AggregateKey {
    pub fn for_finding(finding: &Finding, mode: ScanMode) -> Self {
        match mode {
            ScanMode::WebApp => AggregateKey::WebApp {
                name: finding.name.clone(),
                plugin_id: finding.plugin_id.clone().unwrap_or_default(),
            },
            ScanMode::Infra => AggregateKey::Infra {
                name: finding.name.clone(),
            },
        }
    }

    /// The vulnerability name, independent of key shape.
    pub fn name(&self) -> &str {
        match self {
            AggregateKey::WebApp { name, .. } => name,
            AggregateKey::Infra { name } => name,
        }
    }
}
