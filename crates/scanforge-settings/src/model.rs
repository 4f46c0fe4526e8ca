use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `scanforge.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so
/// forward-compat is easy. Everything is optional; defaults apply at
/// resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScanforgeConfigV1 {
    /// Optional schema string for tooling (`scanforge.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Directory holding the document template tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<String>,

    /// External compiler program (`pdflatex` by default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Per-pass compiler timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_timeout_secs: Option<u64>,

    /// Affected instances shown inline before the remainder moves to the
    /// annex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_instance_limit: Option<usize>,

    /// Category label pinned to the end of the document regardless of
    /// alphabetical order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_last_category: Option<String>,

    /// Bucket label for catalog entries without a subcategory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subcategory: Option<String>,

    /// Directory (relative to the prepared document) for chart artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_dir: Option<String>,

    /// Bar ordering for the per-site chart: `descending` or `ascending`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_sort: Option<String>,
}
