//! Web-application export parsing (JSON, one scan target per file).

use scanforge_types::{Finding, Severity, SeverityCounts};
use serde::Deserialize;
use url::Url;

/// Raw shape of a web-application scan export.
#[derive(Debug, Deserialize)]
struct RawExport {
    #[serde(default)]
    scan: RawScanMeta,
    #[serde(default)]
    findings: Vec<RawFinding>,
}

#[derive(Debug, Default, Deserialize)]
struct RawScanMeta {
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    name: Option<String>,
    risk_factor: Option<String>,
    uri: Option<String>,
    #[serde(default)]
    plugin_id: Option<PluginId>,
}

/// Plugin identifiers appear as strings in some exports and as numbers in
/// others; both collapse to the string form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PluginId {
    Text(String),
    Number(i64),
}

impl PluginId {
    fn into_string(self) -> String {
        match self {
            PluginId::Text(s) => s,
            PluginId::Number(n) => n.to_string(),
        }
    }
}

/// One parsed web-application scan: the declared target, the canonical
/// findings that survived filtering, and this file's severity totals.
#[derive(Clone, Debug, Default)]
pub struct WebAppScan {
    pub target: Option<String>,
    pub findings: Vec<Finding>,
    pub counts: SeverityCounts,
}

/// Parse one web-application export.
///
/// Filtering rules:
/// - findings whose risk factor mentions "info" are dropped
/// - findings whose risk factor is not one of the four report severities
///   are dropped
/// - findings with no name or no URI are dropped
/// - relative URIs resolve against the target's scheme+host; URIs that
///   already carry a host are kept as their own absolute form
pub fn parse_webapp_export(text: &str) -> Result<WebAppScan, serde_json::Error> {
    let raw: RawExport = serde_json::from_str(text)?;

    let mut scan = WebAppScan {
        target: raw.scan.target,
        ..WebAppScan::default()
    };

    for finding in raw.findings {
        let Some(risk) = finding.risk_factor else {
            continue;
        };
        if risk.to_ascii_lowercase().contains("info") {
            continue;
        }
        let Ok(severity) = risk.parse::<Severity>() else {
            continue;
        };
        let (Some(name), Some(uri)) = (finding.name, finding.uri) else {
            continue;
        };
        let Some(instance) = resolve_instance(scan.target.as_deref(), &uri) else {
            continue;
        };

        scan.counts.record(severity);
        scan.findings.push(Finding {
            name,
            severity,
            instance,
            plugin_id: finding.plugin_id.map(PluginId::into_string),
        });
    }

    Ok(scan)
}

/// Produce the absolute affected-instance URI for one finding.
///
/// A URI that already carries a host stands on its own; a relative URI is
/// joined onto the target's scheme+host. Anything unresolvable yields `None`
/// and the finding is dropped.
fn resolve_instance(target: Option<&str>, uri: &str) -> Option<String> {
    match Url::parse(uri) {
        Ok(absolute) if absolute.has_host() => Some(absolute.to_string()),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(target?).ok()?;
            let origin = base.origin();
            if !origin.is_tuple() {
                return None;
            }
            let root = Url::parse(&origin.ascii_serialization()).ok()?;
            root.join(uri).ok().map(|u| u.to_string())
        }
        Err(_) => None,
    }
}

/// Site display name: the target with its scheme stripped.
pub fn strip_scheme(target: &str) -> String {
    match target.split_once("://") {
        Some((_, rest)) => rest.trim_end_matches('/').to_string(),
        None => target.trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export(findings: serde_json::Value) -> String {
        json!({
            "scan": { "target": "https://example.com/portal" },
            "findings": findings,
        })
        .to_string()
    }

    #[test]
    fn relative_uris_resolve_against_target_origin() {
        let text = export(json!([
            { "name": "XSS", "risk_factor": "High", "uri": "/login?next=1", "plugin_id": 98050 }
        ]));
        let scan = parse_webapp_export(&text).expect("parse");
        assert_eq!(scan.findings.len(), 1);
        assert_eq!(scan.findings[0].instance, "https://example.com/login?next=1");
        assert_eq!(scan.findings[0].plugin_id.as_deref(), Some("98050"));
    }

    #[test]
    fn absolute_uris_are_preserved() {
        let text = export(json!([
            { "name": "XSS", "risk_factor": "High", "uri": "https://cdn.example.com/app.js", "plugin_id": "10" }
        ]));
        let scan = parse_webapp_export(&text).expect("parse");
        assert_eq!(scan.findings[0].instance, "https://cdn.example.com/app.js");
    }

    #[test]
    fn informational_findings_are_dropped() {
        let text = export(json!([
            { "name": "Server banner", "risk_factor": "Info", "uri": "/", "plugin_id": 1 },
            { "name": "Server banner", "risk_factor": "informational", "uri": "/", "plugin_id": 1 },
            { "name": "Weak cipher", "risk_factor": "Medium", "uri": "/", "plugin_id": 2 }
        ]));
        let scan = parse_webapp_export(&text).expect("parse");
        assert_eq!(scan.findings.len(), 1);
        assert_eq!(scan.findings[0].name, "Weak cipher");
        assert_eq!(scan.counts.medium, 1);
        assert_eq!(scan.counts.total(), 1);
    }

    #[test]
    fn findings_missing_required_fields_are_dropped() {
        let text = export(json!([
            { "risk_factor": "High", "uri": "/a" },
            { "name": "No URI", "risk_factor": "High" },
            { "name": "Unknown risk", "risk_factor": "severe", "uri": "/b" }
        ]));
        let scan = parse_webapp_export(&text).expect("parse");
        assert!(scan.findings.is_empty());
    }

    #[test]
    fn missing_target_still_keeps_absolute_instances() {
        let text = json!({
            "findings": [
                { "name": "XSS", "risk_factor": "High", "uri": "https://other.example.com/x" },
                { "name": "XSS", "risk_factor": "High", "uri": "/relative" }
            ]
        })
        .to_string();
        let scan = parse_webapp_export(&text).expect("parse");
        assert_eq!(scan.target, None);
        assert_eq!(scan.findings.len(), 1);
        assert_eq!(scan.findings[0].instance, "https://other.example.com/x");
    }

    #[test]
    fn strip_scheme_removes_protocol_and_trailing_slash() {
        assert_eq!(strip_scheme("https://example.com/"), "example.com");
        assert_eq!(strip_scheme("http://example.com"), "example.com");
        assert_eq!(strip_scheme("example.com"), "example.com");
    }
}
