//! Config parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves
//! configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::ScanforgeConfigV1;
pub use resolve::{EffectiveConfig, Overrides};

/// Parse `scanforge.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ScanforgeConfigV1> {
    let cfg: ScanforgeConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the pipeline (defaults + config
/// file + CLI overrides, in ascending precedence).
pub fn resolve_config(
    cfg: ScanforgeConfigV1,
    overrides: Overrides,
) -> anyhow::Result<EffectiveConfig> {
    resolve::resolve_config(cfg, overrides)
}
