//! The report-generation use case.

use crate::placeholders;
use anyhow::Context;
use camino::Utf8PathBuf;
use scanforge_aggregate::{aggregate, conflict_diagnostics, infra_totals};
use scanforge_catalog::TaxonomyCatalog;
use scanforge_charts::ChartRenderer;
use scanforge_compile::{
    apply_placeholders, compile_document, prepare_output_tree, CompilerInvocation, FailureReason,
};
use scanforge_render::{
    assemble_sections, escape_text, render_content, sanitize_image_path, AssemblyOptions,
    ContentLayout,
};
use scanforge_settings::EffectiveConfig;
use scanforge_types::{
    Diagnostic, ReportSummary, ScanMode, SeverityCounts, ToolMeta, SCHEMA_SUMMARY_V1,
};
use std::collections::BTreeMap;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::info;

/// Input for the report-generation use case.
#[derive(Clone, Debug)]
pub struct ReportInput {
    /// Web-application scan exports (JSON).
    pub webapp_files: Vec<Utf8PathBuf>,
    /// Infrastructure scan exports (CSV).
    pub infra_files: Vec<Utf8PathBuf>,
    /// Taxonomy catalog for the web-application content.
    pub webapp_catalog: Utf8PathBuf,
    /// Taxonomy catalog for the infrastructure content.
    pub infra_catalog: Utf8PathBuf,
    /// Pre-allocated directory unique to this report request. Concurrent
    /// requests are safe exactly as long as their directories differ.
    pub output_dir: Utf8PathBuf,
    /// Caller-supplied seed values (organization details, dates, links).
    /// Treated as plain text: every value passes through text escaping.
    pub seed_values: BTreeMap<String, String>,
}

/// Output from the report-generation use case.
#[derive(Clone, Debug)]
pub struct ReportOutput {
    pub summary: ReportSummary,
    /// Classified compiler failure, when the run finished but the document
    /// did not build. `None` means the artifact exists.
    pub compile_failure: Option<FailureReason>,
    pub document_dir: Utf8PathBuf,
    pub summary_path: Utf8PathBuf,
    /// Written only when at least one vulnerability had no catalog entry.
    pub missing_descriptions_path: Option<Utf8PathBuf>,
}

/// Run the full pipeline: extract → aggregate → assemble → charts →
/// template → two-pass compile → summary.
///
/// Per-file and per-aggregate problems never abort the run; they surface
/// as diagnostics in the summary. Anything from a missing template
/// precondition onward aborts with an error carrying the reason.
pub fn run_report(
    input: &ReportInput,
    cfg: &EffectiveConfig,
    charts: &dyn ChartRenderer,
) -> anyhow::Result<ReportOutput> {
    let started_at = OffsetDateTime::now_utc();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // Extraction. Each side tolerates individually broken files.
    let web = scanforge_extract::extract_webapp_batch(&input.webapp_files);
    let infra = scanforge_extract::extract_infra_batch(&input.infra_files);
    diagnostics.extend(web.diagnostics.iter().cloned());
    diagnostics.extend(infra.diagnostics.iter().cloned());
    info!(
        web_findings = web.findings.len(),
        infra_findings = infra.findings.len(),
        "extraction finished"
    );

    // Aggregation. Findings are discarded once merged.
    let web_aggregates = aggregate(web.findings, ScanMode::WebApp);
    let infra_aggregates = aggregate(infra.findings, ScanMode::Infra);
    diagnostics.extend(conflict_diagnostics(&infra_aggregates));

    let web_totals = web.totals;
    let infra_counts = infra_totals(&infra_aggregates);

    // Taxonomy matching and content assembly.
    let webapp_catalog = TaxonomyCatalog::load(&input.webapp_catalog)
        .with_context(|| format!("load catalog {}", input.webapp_catalog))?;
    let infra_catalog = TaxonomyCatalog::load(&input.infra_catalog)
        .with_context(|| format!("load catalog {}", input.infra_catalog))?;

    let assembly_options = AssemblyOptions {
        inline_limit: cfg.inline_instance_limit,
        pinned_last_category: cfg.pinned_last_category.clone(),
        default_subcategory: cfg.default_subcategory.clone(),
    };
    let web_assembly = assemble_sections(&web_aggregates, &webapp_catalog, &assembly_options);
    let infra_assembly = assemble_sections(&infra_aggregates, &infra_catalog, &assembly_options);
    diagnostics.extend(web_assembly.diagnostics.iter().cloned());
    diagnostics.extend(infra_assembly.diagnostics.iter().cloned());

    let web_content = render_content(&web_assembly.sections, &ContentLayout::for_mode(ScanMode::WebApp));
    let infra_content =
        render_content(&infra_assembly.sections, &ContentLayout::for_mode(ScanMode::Infra));

    let mut missing_descriptions: Vec<String> = web_assembly
        .missing_descriptions
        .iter()
        .chain(infra_assembly.missing_descriptions.iter())
        .cloned()
        .collect();
    missing_descriptions.sort();
    missing_descriptions.dedup();

    // Prepare the document tree before charts so they can land inside it.
    let document_dir = input.output_dir.join("document");
    prepare_output_tree(&cfg.template_dir, &document_dir)
        .context("prepare document template")?;

    // Charts. A skipped chart leaves its placeholder empty.
    let chart_dir = document_dir.join(&cfg.chart_dir);
    let web_donut_ref = format!("{}/severity-web.svg", cfg.chart_dir);
    let infra_donut_ref = format!("{}/severity-infra.svg", cfg.chart_dir);
    let site_bars_ref = format!("{}/findings-per-site.svg", cfg.chart_dir);

    let web_donut = charts
        .severity_donut(&web_totals, &chart_dir.join("severity-web.svg"))
        .context("render web severity donut")?;
    let infra_donut = charts
        .severity_donut(&infra_counts, &chart_dir.join("severity-infra.svg"))
        .context("render infrastructure severity donut")?;
    let site_bars = charts
        .per_target_bars(&web.site_counts, &chart_dir.join("findings-per-site.svg"))
        .context("render per-site bar chart")?;

    // Placeholder map: caller seeds (escaped) plus computed values.
    let mut values: BTreeMap<String, String> = input
        .seed_values
        .iter()
        .map(|(key, value)| (key.clone(), escape_text(value)))
        .collect();

    values.insert(
        placeholders::TOTAL_VULNERABILITIES.to_string(),
        (web_totals.total() + infra_counts.total()).to_string(),
    );
    values.insert(
        placeholders::TOTAL_VULNERABILITIES_WEB.to_string(),
        web_totals.total().to_string(),
    );
    values.insert(
        placeholders::TOTAL_VULNERABILITIES_INFRA.to_string(),
        infra_counts.total().to_string(),
    );
    insert_severity_values(&mut values, placeholders::WEB_PREFIX, &web_totals);
    insert_severity_values(&mut values, placeholders::INFRA_PREFIX, &infra_counts);
    values.insert(
        placeholders::TOTAL_SITES.to_string(),
        web.targets.len().to_string(),
    );
    values.insert(
        placeholders::TOTAL_HOSTS.to_string(),
        infra.hosts.len().to_string(),
    );
    values.insert(placeholders::WEB_CONTENT.to_string(), web_content);
    values.insert(placeholders::INFRA_CONTENT.to_string(), infra_content);
    values.insert(
        placeholders::SEVERITY_DONUT_WEB.to_string(),
        if web_donut.was_written() {
            figure_block(&web_donut_ref, "Web-application findings by severity", "0.5")
        } else {
            String::new()
        },
    );
    values.insert(
        placeholders::SEVERITY_DONUT_INFRA.to_string(),
        if infra_donut.was_written() {
            figure_block(&infra_donut_ref, "Infrastructure findings by severity", "0.5")
        } else {
            String::new()
        },
    );
    values.insert(
        placeholders::SITE_BAR_CHART.to_string(),
        if site_bars.was_written() {
            figure_block(&site_bars_ref, "Total findings per site", "1.0")
        } else {
            String::new()
        },
    );

    let main_tex = document_dir.join("main.tex");
    apply_placeholders(&main_tex, &values).context("substitute placeholders")?;

    // Persist the missing-descriptions list for operator follow-up.
    let missing_descriptions_path = if missing_descriptions.is_empty() {
        None
    } else {
        let path = input.output_dir.join("missing_descriptions.txt");
        let mut text = missing_descriptions.join("\n");
        text.push('\n');
        std::fs::write(&path, text).with_context(|| format!("write {path}"))?;
        Some(path)
    };

    // Two-pass compilation.
    let invocation = CompilerInvocation {
        program: &cfg.compiler,
        main_file: "main.tex",
        out_dir: &document_dir,
        timeout: Duration::from_secs(cfg.compiler_timeout_secs),
    };
    let compile = compile_document(&invocation).context("compile document")?;

    let log_path = input.output_dir.join("compile.log");
    std::fs::write(&log_path, &compile.log).with_context(|| format!("write {log_path}"))?;

    let summary = ReportSummary {
        schema: SCHEMA_SUMMARY_V1.to_string(),
        tool: ToolMeta {
            name: "scanforge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        web_totals,
        infra_totals: infra_counts,
        sites_analyzed: web.targets.len() as u32,
        hosts_analyzed: infra.hosts.len() as u32,
        missing_descriptions,
        diagnostics,
        compilation: Some(compile.result.clone()),
    };

    let summary_path = input.output_dir.join("summary.json");
    let serialized = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    std::fs::write(&summary_path, serialized).with_context(|| format!("write {summary_path}"))?;

    Ok(ReportOutput {
        summary,
        compile_failure: compile.reason,
        document_dir,
        summary_path,
        missing_descriptions_path,
    })
}

fn insert_severity_values(
    values: &mut BTreeMap<String, String>,
    prefix: &str,
    counts: &SeverityCounts,
) {
    for severity in scanforge_types::Severity::ALL {
        values.insert(
            placeholders::severity_key(prefix, severity),
            counts.get(severity).to_string(),
        );
    }
}

fn figure_block(image_ref: &str, caption: &str, width: &str) -> String {
    format!(
        "\\begin{{figure}}[h!]\n\\centering\n\
         \\includegraphics[width={width}\\textwidth]{{{}}}\n\
         \\caption{{{}}}\n\\end{{figure}}\n\\FloatBarrier\n",
        sanitize_image_path(image_ref),
        escape_text(caption),
    )
}
