//! The aggregation engine: reduce findings into per-vulnerability records.
//!
//! Aggregation is a pure keyed reduction. Grouping order is irrelevant to
//! the result, and partial maps merge losslessly, so map-then-merge
//! parallel aggregation is valid.

#![forbid(unsafe_code)]

use scanforge_types::{ids, AggregateKey, Diagnostic, Finding, ScanMode, Severity, SeverityCounts};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// All findings sharing one [`AggregateKey`], merged across instances.
///
/// Owned by this engine; mutated only by merge operations during
/// aggregation and read-only afterwards. The instance set is never empty:
/// an aggregate only exists because at least one finding produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VulnerabilityAggregate {
    pub key: AggregateKey,
    pub instances: BTreeSet<String>,
    pub observed_severities: BTreeSet<Severity>,
}

impl VulnerabilityAggregate {
    fn from_finding(finding: &Finding, mode: ScanMode) -> Self {
        VulnerabilityAggregate {
            key: AggregateKey::for_finding(finding, mode),
            instances: BTreeSet::from([finding.instance.clone()]),
            observed_severities: BTreeSet::from([finding.severity]),
        }
    }

    fn absorb(&mut self, finding: Finding) {
        self.instances.insert(finding.instance);
        self.observed_severities.insert(finding.severity);
    }

    /// The severity this aggregate is reported under. With a single
    /// observed level that level wins outright; with several, the highest
    /// observed level wins (see [`conflict_diagnostics`]).
    pub fn effective_severity(&self) -> Severity {
        self.observed_severities
            .iter()
            .copied()
            .max()
            // The instance set invariant guarantees at least one severity.
            .unwrap_or(Severity::Low)
    }

    pub fn has_severity_conflict(&self) -> bool {
        self.observed_severities.len() > 1
    }
}

/// Aggregates keyed for deterministic iteration.
pub type AggregateMap = BTreeMap<AggregateKey, VulnerabilityAggregate>;

/// Reduce a sequence of findings into aggregates. Input order does not
/// affect the result.
pub fn aggregate(findings: impl IntoIterator<Item = Finding>, mode: ScanMode) -> AggregateMap {
    let mut map = AggregateMap::new();
    for finding in findings {
        let key = AggregateKey::for_finding(&finding, mode);
        match map.get_mut(&key) {
            Some(existing) => existing.absorb(finding),
            None => {
                map.insert(key, VulnerabilityAggregate::from_finding(&finding, mode));
            }
        }
    }
    map
}

/// Merge one partial aggregate map into another. `merge(a, b)` after
/// aggregating disjoint batches equals aggregating the concatenation.
pub fn merge(into: &mut AggregateMap, other: AggregateMap) {
    for (key, aggregate) in other {
        match into.get_mut(&key) {
            Some(existing) => {
                existing.instances.extend(aggregate.instances);
                existing
                    .observed_severities
                    .extend(aggregate.observed_severities);
            }
            None => {
                into.insert(key, aggregate);
            }
        }
    }
}

/// One diagnostic per aggregate whose findings disagreed about severity.
/// The tie-break (highest observed level) is applied by
/// [`VulnerabilityAggregate::effective_severity`]; this only reports it.
pub fn conflict_diagnostics(map: &AggregateMap) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for aggregate in map.values() {
        if !aggregate.has_severity_conflict() {
            continue;
        }
        let levels: Vec<&str> = aggregate
            .observed_severities
            .iter()
            .rev()
            .map(|s| s.label())
            .collect();
        let message = format!(
            "multiple severity levels for '{}': {}; reporting {}",
            aggregate.key.name(),
            levels.join(", "),
            aggregate.effective_severity().label(),
        );
        warn!(vulnerability = aggregate.key.name(), "{message}");
        out.push(Diagnostic::new(ids::DIAG_SEVERITY_CONFLICT, message));
    }
    out
}

/// Infrastructure severity totals: each aggregate contributes its affected
/// host count under its effective severity.
pub fn infra_totals(map: &AggregateMap) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for aggregate in map.values() {
        counts.add(
            aggregate.effective_severity(),
            aggregate.instances.len() as u32,
        );
    }
    counts
}
