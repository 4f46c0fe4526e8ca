use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity is intentionally closed: the four levels that appear in the
/// rendered document. Informational findings are dropped at the extraction
/// boundary and never reach this enum.
///
/// Ordering follows impact: `Low < Medium < High < Critical`, so `max()`
/// over a set of observed severities yields the tie-break winner.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All levels in report display order (most severe first).
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Capitalized label as it appears in document text and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}

/// Per-severity totals, always carried as the full 4-tuple so zero counts
/// stay visible wherever totals are surfaced.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn add(&mut self, severity: Severity, n: u32) {
        match severity {
            Severity::Critical => self.critical += n,
            Severity::High => self.high += n,
            Severity::Medium => self.medium += n,
            Severity::Low => self.low += n,
        }
    }

    pub fn record(&mut self, severity: Severity) {
        self.add(severity, 1);
    }

    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("  HIGH ".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("medium".parse::<Severity>(), Ok(Severity::Medium));
        assert_eq!("LoW".parse::<Severity>(), Ok(Severity::Low));
    }

    #[test]
    fn informational_and_unknown_levels_are_rejected() {
        assert!("info".parse::<Severity>().is_err());
        assert!("informational".parse::<Severity>().is_err());
        assert!("none".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn ordering_ranks_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);

        let max = [Severity::High, Severity::Critical, Severity::Low]
            .into_iter()
            .max();
        assert_eq!(max, Some(Severity::Critical));
    }

    #[test]
    fn counts_cover_all_four_levels() {
        let mut counts = SeverityCounts::default();
        assert!(counts.is_empty());

        counts.record(Severity::Critical);
        counts.add(Severity::Low, 3);
        assert_eq!(counts.get(Severity::Critical), 1);
        assert_eq!(counts.get(Severity::High), 0);
        assert_eq!(counts.get(Severity::Low), 3);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn counts_serialize_with_zero_fields_present() {
        let counts = SeverityCounts {
            critical: 2,
            ..SeverityCounts::default()
        };
        let json = serde_json::to_value(&counts).expect("serialize counts");
        assert_eq!(json["critical"], 2);
        assert_eq!(json["high"], 0);
        assert_eq!(json["medium"], 0);
        assert_eq!(json["low"], 0);
    }
}
