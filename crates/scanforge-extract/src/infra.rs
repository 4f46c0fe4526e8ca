//! Infrastructure export parsing (CSV, one observation per row).

use scanforge_types::{Finding, Severity};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Raw row shape. Exports carry many more columns; only these three matter
/// and the reader is flexible about the rest.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Host")]
    host: Option<String>,
    #[serde(rename = "Risk")]
    risk: Option<String>,
}

/// One parsed infrastructure export: canonical findings plus every distinct
/// host that appeared in the file (hosts count as analysed even when all of
/// their rows were informational).
#[derive(Clone, Debug, Default)]
pub struct InfraExport {
    pub findings: Vec<Finding>,
    pub hosts: BTreeSet<String>,
}

/// Parse one infrastructure export.
///
/// Row rules:
/// - rows missing any of name, host or risk are dropped
/// - rows whose risk is not one of the four report severities are dropped
///   (this is where informational rows fall out)
/// - individually malformed rows are skipped without failing the file
pub fn parse_infra_export(text: &str) -> Result<InfraExport, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    // Header problems (missing columns, unreadable header row) fail the
    // whole file; row problems only drop the row.
    reader.headers()?;

    let mut export = InfraExport::default();
    for row in reader.deserialize::<RawRow>() {
        let Ok(row) = row else {
            continue;
        };

        if let Some(host) = row.host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            export.hosts.insert(host.to_string());
        }

        let (Some(name), Some(host), Some(risk)) = (row.name, row.host, row.risk) else {
            continue;
        };
        let name = name.trim().to_string();
        let host = host.trim().to_string();
        if name.is_empty() || host.is_empty() {
            continue;
        }
        let Ok(severity) = risk.parse::<Severity>() else {
            continue;
        };

        export.findings.push(Finding {
            name,
            severity,
            instance: host,
            plugin_id: None,
        });
    }

    Ok(export)
}
