//! CLI entry point for scanforge.
//!
//! This module is intentionally thin: it handles argument parsing, logging
//! setup, I/O, and exit codes. All pipeline logic lives in the
//! `scanforge-app` crate.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use scanforge_app::{placeholders, run_report, ReportInput};
use scanforge_charts::SvgChartRenderer;
use scanforge_compile::FailureReason;
use scanforge_settings::Overrides;
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "scanforge",
    version,
    about = "Aggregate vulnerability-scan exports into a compiled audit document"
)]
struct Cli {
    /// Path to scanforge config TOML.
    #[arg(long, default_value = "scanforge.toml")]
    config: Utf8PathBuf,

    /// Override the document template directory.
    #[arg(long)]
    template_dir: Option<Utf8PathBuf>,

    /// Override the external compiler program.
    #[arg(long)]
    compiler: Option<String>,

    /// Override the per-pass compiler timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Override the inline affected-instance limit.
    #[arg(long)]
    inline_limit: Option<usize>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline and compile the audit document.
    Report {
        /// Directory of web-application scan exports (*.json).
        #[arg(long)]
        webapp_dir: Option<Utf8PathBuf>,

        /// Directory of infrastructure scan exports (*.csv).
        #[arg(long)]
        infra_dir: Option<Utf8PathBuf>,

        /// Taxonomy catalog for web-application content.
        #[arg(long)]
        webapp_catalog: Utf8PathBuf,

        /// Taxonomy catalog for infrastructure content.
        #[arg(long)]
        infra_catalog: Utf8PathBuf,

        /// Output directory unique to this report.
        #[arg(long)]
        out: Utf8PathBuf,

        /// Organization display name for the cover page.
        #[arg(long, default_value = "")]
        org_name: String,

        /// Organization acronym for the cover page.
        #[arg(long, default_value = "")]
        acronym: String,

        /// Extra template seed values as KEY=VALUE (repeatable).
        #[arg(long = "set", value_name = "KEY=VALUE")]
        seed: Vec<String>,
    },

    /// Parse one scan export and print its canonical findings as JSON.
    Extract {
        /// The export file to parse.
        #[arg(long)]
        file: Utf8PathBuf,

        /// Export format: `webapp` (JSON) or `infra` (CSV).
        #[arg(long)]
        format: String,
    },

    /// Scan a saved compiler log for the image-not-found signature.
    ClassifyLog {
        /// Path to the saved log file.
        #[arg(long)]
        log: Utf8PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report {
            ref webapp_dir,
            ref infra_dir,
            ref webapp_catalog,
            ref infra_catalog,
            ref out,
            ref org_name,
            ref acronym,
            ref seed,
        } => cmd_report(
            &cli,
            webapp_dir.clone(),
            infra_dir.clone(),
            webapp_catalog.clone(),
            infra_catalog.clone(),
            out.clone(),
            org_name.clone(),
            acronym.clone(),
            seed.clone(),
        ),
        Commands::Extract { file, format } => cmd_extract(&file, &format),
        Commands::ClassifyLog { log } => cmd_classify_log(&log),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_report(
    cli: &Cli,
    webapp_dir: Option<Utf8PathBuf>,
    infra_dir: Option<Utf8PathBuf>,
    webapp_catalog: Utf8PathBuf,
    infra_catalog: Utf8PathBuf,
    out: Utf8PathBuf,
    org_name: String,
    acronym: String,
    seed: Vec<String>,
) -> anyhow::Result<()> {
    // Missing config file is allowed; defaults apply.
    let cfg_text = std::fs::read_to_string(&cli.config).unwrap_or_default();
    let cfg = scanforge_settings::parse_config_toml(&cfg_text)
        .with_context(|| format!("parse config {}", cli.config))?;
    let overrides = Overrides {
        template_dir: cli.template_dir.clone(),
        compiler: cli.compiler.clone(),
        compiler_timeout_secs: cli.timeout_secs,
        inline_instance_limit: cli.inline_limit,
    };
    let effective = scanforge_settings::resolve_config(cfg, overrides).context("resolve config")?;

    let webapp_files = match &webapp_dir {
        Some(dir) => scanforge_extract::discover_files(dir, "json")
            .with_context(|| format!("list web-application exports in {dir}"))?,
        None => Vec::new(),
    };
    let infra_files = match &infra_dir {
        Some(dir) => scanforge_extract::discover_files(dir, "csv")
            .with_context(|| format!("list infrastructure exports in {dir}"))?,
        None => Vec::new(),
    };

    let mut seed_values = BTreeMap::new();
    seed_values.insert(placeholders::ORGANIZATION_NAME.to_string(), org_name);
    seed_values.insert(placeholders::ACRONYM.to_string(), acronym);
    for pair in seed {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("invalid --set value (expected KEY=VALUE): {pair}");
        };
        seed_values.insert(key.to_string(), value.to_string());
    }

    std::fs::create_dir_all(&out).with_context(|| format!("create output directory {out}"))?;

    let input = ReportInput {
        webapp_files,
        infra_files,
        webapp_catalog,
        infra_catalog,
        output_dir: out,
        seed_values,
    };

    let output = run_report(&input, &effective, &SvgChartRenderer { bar_sort: effective.bar_sort })?;

    for diagnostic in &output.summary.diagnostics {
        eprintln!("note [{}]: {}", diagnostic.code, diagnostic.message);
    }
    if let Some(path) = &output.missing_descriptions_path {
        eprintln!(
            "{} vulnerability name(s) without a catalog entry; see {path}",
            output.summary.missing_descriptions.len()
        );
    }

    match &output.compile_failure {
        None => {
            let compilation = output
                .summary
                .compilation
                .as_ref()
                .context("summary carries a compilation result")?;
            if let Some(artifact) = &compilation.artifact_path {
                println!("compiled: {artifact}");
            }
            println!("summary: {}", output.summary_path);
            Ok(())
        }
        Some(reason) => {
            // Each classified reason gets its own distinct presentation.
            match reason {
                FailureReason::MissingAssets(files) => {
                    eprintln!("compilation failed: unresolved image references:");
                    for file in files {
                        eprintln!("  - {file}");
                    }
                }
                FailureReason::ToolError(code) => {
                    eprintln!("compilation failed: compiler exited with status {code}");
                }
                FailureReason::SilentFailure => {
                    eprintln!(
                        "compilation failed: compiler reported success but produced no artifact"
                    );
                }
            }
            eprintln!("summary: {}", output.summary_path);
            std::process::exit(2);
        }
    }
}

fn cmd_extract(file: &Utf8PathBuf, format: &str) -> anyhow::Result<()> {
    let format = match format {
        "webapp" => scanforge_extract::ScanFormat::WebAppJson,
        "infra" => scanforge_extract::ScanFormat::InfraCsv,
        other => anyhow::bail!("unknown format: {other} (expected 'webapp' or 'infra')"),
    };
    let findings = scanforge_extract::extract_file(file, format)?;
    let json = serde_json::to_string_pretty(&findings).context("serialize findings")?;
    println!("{json}");
    Ok(())
}

fn cmd_classify_log(log: &Utf8PathBuf) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(log).with_context(|| format!("read {log}"))?;
    let files = scanforge_compile::missing_asset_files(&text);
    if files.is_empty() {
        println!("no image-not-found signature in {log}");
    } else {
        for file in files {
            println!("{file}");
        }
    }
    Ok(())
}
