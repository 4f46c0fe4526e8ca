//! Stable diagnostic codes.
//!
//! Codes are short snake_case discriminators carried on [`crate::Diagnostic`]
//! records so callers can filter programmatically without parsing messages.

/// One source file could not be read or parsed and was skipped.
pub const DIAG_MALFORMED_INPUT: &str = "malformed_input";

/// More than one severity level was observed for a single vulnerability;
/// the highest observed level was reported.
pub const DIAG_SEVERITY_CONFLICT: &str = "severity_conflict";

/// An aggregated vulnerability had no entry in the taxonomy catalog and was
/// left out of the document body.
pub const DIAG_NO_TAXONOMY_MATCH: &str = "no_taxonomy_match";
