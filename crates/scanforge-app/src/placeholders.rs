//! Placeholder keys recognized in the document template.
//!
//! Template authors write these as `[KEY]` tokens; the pipeline fills the
//! computed ones and passes caller-supplied seed values (organization
//! details, dates, links) through text escaping.

pub const ORGANIZATION_NAME: &str = "ORGANIZATION NAME";
pub const ACRONYM: &str = "ACRONYM";

pub const WEB_CONTENT: &str = "WEB CONTENT";
pub const INFRA_CONTENT: &str = "INFRA CONTENT";

pub const TOTAL_VULNERABILITIES: &str = "TOTAL VULNERABILITIES";
pub const TOTAL_VULNERABILITIES_WEB: &str = "TOTAL VULNERABILITIES WEB";
pub const TOTAL_VULNERABILITIES_INFRA: &str = "TOTAL VULNERABILITIES INFRA";

pub const TOTAL_SITES: &str = "TOTAL SITES";
pub const TOTAL_HOSTS: &str = "TOTAL HOSTS";

pub const SEVERITY_DONUT_WEB: &str = "SEVERITY DONUT WEB";
pub const SEVERITY_DONUT_INFRA: &str = "SEVERITY DONUT INFRA";
pub const SITE_BAR_CHART: &str = "SITE BAR CHART";

/// Per-severity keys: `WEB CRITICAL` .. `INFRA LOW`.
pub fn severity_key(prefix: &str, severity: scanforge_types::Severity) -> String {
    format!("{prefix} {}", severity.label().to_uppercase())
}

pub const WEB_PREFIX: &str = "WEB";
pub const INFRA_PREFIX: &str = "INFRA";
