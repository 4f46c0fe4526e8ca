//! Scan-export parsing into canonical findings.
//!
//! Two incompatible raw formats come in, one representation comes out:
//! - per-site web-application exports (JSON, one scan target per file)
//! - per-host infrastructure exports (CSV, one row per observation)
//!
//! Malformed or unreadable files fail locally: the batch helpers skip the
//! file, log a warning and record a diagnostic, and the run continues.

#![forbid(unsafe_code)]

mod infra;
mod webapp;

use camino::{Utf8Path, Utf8PathBuf};
use scanforge_types::{ids, Diagnostic, Finding, SeverityCounts, TargetCount};
use std::collections::BTreeSet;
use tracing::warn;

pub use infra::{parse_infra_export, InfraExport};
pub use webapp::{parse_webapp_export, strip_scheme, WebAppScan};

/// Declared format of one raw scan file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanFormat {
    WebAppJson,
    InfraCsv,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("parse {path}: {source}")]
    Csv {
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Parse one scan file of a declared format into canonical findings.
pub fn extract_file(path: &Utf8Path, format: ScanFormat) -> Result<Vec<Finding>, ExtractError> {
    match format {
        ScanFormat::WebAppJson => Ok(extract_webapp_file(path)?.findings),
        ScanFormat::InfraCsv => Ok(extract_infra_file(path)?.findings),
    }
}

/// Parse one web-application export file.
pub fn extract_webapp_file(path: &Utf8Path) -> Result<WebAppScan, ExtractError> {
    let text = read_file(path)?;
    parse_webapp_export(&text).map_err(|source| ExtractError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Parse one infrastructure export file.
pub fn extract_infra_file(path: &Utf8Path) -> Result<InfraExport, ExtractError> {
    let text = read_file(path)?;
    parse_infra_export(&text).map_err(|source| ExtractError::Csv {
        path: path.to_owned(),
        source,
    })
}

fn read_file(path: &Utf8Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Everything a report needs from the web-application side of a scan batch.
#[derive(Clone, Debug, Default)]
pub struct WebAppBatch {
    pub findings: Vec<Finding>,
    /// Distinct scan targets across all files, as declared by the scans.
    pub targets: BTreeSet<String>,
    /// Per-site severity breakdown (site names with scheme stripped).
    pub site_counts: Vec<TargetCount>,
    /// Per-finding severity totals across all files.
    pub totals: SeverityCounts,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a report needs from the infrastructure side of a scan batch.
#[derive(Clone, Debug, Default)]
pub struct InfraBatch {
    pub findings: Vec<Finding>,
    /// Distinct hosts seen across all files, regardless of row severity.
    pub hosts: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract a whole batch of web-application files. Never fails: files that
/// cannot be read or parsed are skipped with a diagnostic.
pub fn extract_webapp_batch(paths: &[Utf8PathBuf]) -> WebAppBatch {
    let mut batch = WebAppBatch::default();

    for path in paths {
        let scan = match extract_webapp_file(path) {
            Ok(scan) => scan,
            Err(err) => {
                warn!(file = %path, error = %err, "skipping unreadable web-application export");
                batch
                    .diagnostics
                    .push(Diagnostic::new(ids::DIAG_MALFORMED_INPUT, err.to_string()));
                continue;
            }
        };

        if let Some(target) = &scan.target {
            batch.targets.insert(target.clone());
            batch.site_counts.push(TargetCount {
                target: strip_scheme(target),
                counts: scan.counts,
            });
        }
        for severity in scan.findings.iter().map(|f| f.severity) {
            batch.totals.record(severity);
        }
        batch.findings.extend(scan.findings);
    }

    // One file per target is the normal shape, but repeated targets fold
    // into a single bar on the per-site chart.
    batch.site_counts = fold_site_counts(batch.site_counts);
    batch
}

/// Extract a whole batch of infrastructure files. Never fails: files that
/// cannot be read or parsed are skipped with a diagnostic.
pub fn extract_infra_batch(paths: &[Utf8PathBuf]) -> InfraBatch {
    let mut batch = InfraBatch::default();

    for path in paths {
        let export = match extract_infra_file(path) {
            Ok(export) => export,
            Err(err) => {
                warn!(file = %path, error = %err, "skipping unreadable infrastructure export");
                batch
                    .diagnostics
                    .push(Diagnostic::new(ids::DIAG_MALFORMED_INPUT, err.to_string()));
                continue;
            }
        };
        batch.hosts.extend(export.hosts);
        batch.findings.extend(export.findings);
    }

    batch
}

/// Discover all files with the given extension in one directory,
/// lexicographically sorted so batch composition is deterministic.
pub fn discover_files(dir: &Utf8Path, extension: &str) -> Result<Vec<Utf8PathBuf>, ExtractError> {
    let entries = dir.read_dir_utf8().map_err(|source| ExtractError::Io {
        path: dir.to_owned(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ExtractError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case(extension)) {
            files.push(path.to_owned());
        }
    }
    files.sort();
    Ok(files)
}

fn fold_site_counts(rows: Vec<TargetCount>) -> Vec<TargetCount> {
    let mut folded: Vec<TargetCount> = Vec::with_capacity(rows.len());
    for row in rows {
        match folded.iter_mut().find(|r| r.target == row.target) {
            Some(existing) => {
                for severity in scanforge_types::Severity::ALL {
                    existing.counts.add(severity, row.counts.get(severity));
                }
            }
            None => folded.push(row),
        }
    }
    folded
}
