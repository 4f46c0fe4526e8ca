use crate::model::ScanforgeConfigV1;
use camino::Utf8PathBuf;
use scanforge_charts::SortOrder;

/// CLI-level overrides; highest precedence.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub template_dir: Option<Utf8PathBuf>,
    pub compiler: Option<String>,
    pub compiler_timeout_secs: Option<u64>,
    pub inline_instance_limit: Option<usize>,
}

/// The resolved configuration the pipeline runs with.
#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub template_dir: Utf8PathBuf,
    pub compiler: String,
    pub compiler_timeout_secs: u64,
    pub inline_instance_limit: usize,
    pub pinned_last_category: String,
    pub default_subcategory: String,
    pub chart_dir: String,
    pub bar_sort: SortOrder,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        EffectiveConfig {
            template_dir: Utf8PathBuf::from("templates/report"),
            compiler: "pdflatex".to_string(),
            compiler_timeout_secs: 120,
            inline_instance_limit: 10,
            pinned_last_category: "Other Critical Vulnerabilities and Exploits".to_string(),
            default_subcategory: "Other".to_string(),
            chart_dir: "assets/charts".to_string(),
            bar_sort: SortOrder::Descending,
        }
    }
}

pub fn resolve_config(
    cfg: ScanforgeConfigV1,
    overrides: Overrides,
) -> anyhow::Result<EffectiveConfig> {
    let mut effective = EffectiveConfig::default();

    if let Some(dir) = cfg.template_dir {
        effective.template_dir = Utf8PathBuf::from(dir);
    }
    if let Some(compiler) = cfg.compiler {
        effective.compiler = compiler;
    }
    if let Some(timeout) = cfg.compiler_timeout_secs {
        effective.compiler_timeout_secs = timeout;
    }
    if let Some(limit) = cfg.inline_instance_limit {
        effective.inline_instance_limit = limit;
    }
    if let Some(category) = cfg.pinned_last_category {
        effective.pinned_last_category = category;
    }
    if let Some(subcategory) = cfg.default_subcategory {
        effective.default_subcategory = subcategory;
    }
    if let Some(chart_dir) = cfg.chart_dir {
        effective.chart_dir = chart_dir;
    }
    if let Some(sort) = cfg.bar_sort.as_deref() {
        effective.bar_sort = parse_sort_order(sort)?;
    }

    if let Some(dir) = overrides.template_dir {
        effective.template_dir = dir;
    }
    if let Some(compiler) = overrides.compiler {
        effective.compiler = compiler;
    }
    if let Some(timeout) = overrides.compiler_timeout_secs {
        effective.compiler_timeout_secs = timeout;
    }
    if let Some(limit) = overrides.inline_instance_limit {
        effective.inline_instance_limit = limit;
    }

    if effective.compiler_timeout_secs == 0 {
        anyhow::bail!("compiler_timeout_secs must be positive");
    }
    if effective.inline_instance_limit == 0 {
        anyhow::bail!("inline_instance_limit must be positive");
    }

    Ok(effective)
}

fn parse_sort_order(v: &str) -> anyhow::Result<SortOrder> {
    match v {
        "descending" => Ok(SortOrder::Descending),
        "ascending" => Ok(SortOrder::Ascending),
        other => anyhow::bail!("unknown bar_sort: {other} (expected 'descending' or 'ascending')"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = parse_config_toml("").expect("parse empty");
        let effective = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(effective.compiler, "pdflatex");
        assert_eq!(effective.compiler_timeout_secs, 120);
        assert_eq!(effective.inline_instance_limit, 10);
        assert_eq!(effective.bar_sort, SortOrder::Descending);
        assert_eq!(
            effective.pinned_last_category,
            "Other Critical Vulnerabilities and Exploits"
        );
    }

    #[test]
    fn config_values_override_defaults() {
        let cfg = parse_config_toml(
            r#"
template_dir = "custom/template"
compiler = "lualatex"
compiler_timeout_secs = 30
inline_instance_limit = 5
bar_sort = "ascending"
"#,
        )
        .expect("parse");
        let effective = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(effective.template_dir, Utf8PathBuf::from("custom/template"));
        assert_eq!(effective.compiler, "lualatex");
        assert_eq!(effective.compiler_timeout_secs, 30);
        assert_eq!(effective.inline_instance_limit, 5);
        assert_eq!(effective.bar_sort, SortOrder::Ascending);
    }

    #[test]
    fn overrides_beat_config_values() {
        let cfg = parse_config_toml("compiler = \"lualatex\"").expect("parse");
        let overrides = Overrides {
            compiler: Some("xelatex".to_string()),
            compiler_timeout_secs: Some(5),
            ..Overrides::default()
        };
        let effective = resolve_config(cfg, overrides).expect("resolve");
        assert_eq!(effective.compiler, "xelatex");
        assert_eq!(effective.compiler_timeout_secs, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cfg = parse_config_toml("bar_sort = \"sideways\"").expect("parse");
        assert!(resolve_config(cfg, Overrides::default()).is_err());

        let cfg = parse_config_toml("compiler_timeout_secs = 0").expect("parse");
        assert!(resolve_config(cfg, Overrides::default()).is_err());

        assert!(parse_config_toml("inline_instance_limit = \"ten\"").is_err());
    }
}
