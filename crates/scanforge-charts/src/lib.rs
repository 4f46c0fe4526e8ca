//! Chart rendering for report documents.
//!
//! Two specializations share one policy: with nothing to show, no artifact
//! is produced. A chart never renders zero-sized wedges or bars.

#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use plotters::element::Pie;
use plotters::prelude::*;
use scanforge_types::{Severity, SeverityCounts, TargetCount};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("create chart directory {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("render chart: {0}")]
    Draw(String),
}

/// Whether a chart was written or skipped for lack of data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartOutcome {
    Written,
    Skipped,
}

impl ChartOutcome {
    pub fn was_written(self) -> bool {
        matches!(self, ChartOutcome::Written)
    }
}

/// Bar ordering for the per-target chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// Injected collaborator: report generation renders charts through this
/// seam so tests and callers can substitute their own implementation.
pub trait ChartRenderer {
    /// Severity-distribution donut. All-zero counts skip the artifact.
    fn severity_donut(
        &self,
        counts: &SeverityCounts,
        out: &Utf8Path,
    ) -> Result<ChartOutcome, ChartError>;

    /// Per-target totals bar chart. Empty or all-zero rows skip the
    /// artifact.
    fn per_target_bars(
        &self,
        rows: &[TargetCount],
        out: &Utf8Path,
    ) -> Result<ChartOutcome, ChartError>;
}

/// SVG implementation on plotters.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgChartRenderer {
    pub bar_sort: SortOrder,
}

fn severity_color(severity: Severity) -> RGBColor {
    match severity {
        Severity::Critical => RGBColor(0x8B, 0x00, 0x00),
        Severity::High => RGBColor(0xFF, 0x30, 0x30),
        Severity::Medium => RGBColor(0xFF, 0xE0, 0x66),
        Severity::Low => RGBColor(0x87, 0xF1, 0xFF),
    }
}

fn ensure_parent(out: &Utf8Path) -> Result<(), ChartError> {
    if let Some(parent) = out.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ChartError::Io {
            path: parent.to_owned(),
            source,
        })?;
    }
    Ok(())
}

impl ChartRenderer for SvgChartRenderer {
    fn severity_donut(
        &self,
        counts: &SeverityCounts,
        out: &Utf8Path,
    ) -> Result<ChartOutcome, ChartError> {
        // Only levels with observations get a wedge.
        let data: Vec<(Severity, u32)> = Severity::ALL
            .into_iter()
            .filter_map(|severity| {
                let count = counts.get(severity);
                (count > 0).then_some((severity, count))
            })
            .collect();

        if data.is_empty() {
            debug!(chart = %out, "no severity data; skipping donut");
            return Ok(ChartOutcome::Skipped);
        }

        ensure_parent(out)?;

        let root = SVGBackend::new(out.as_std_path(), (640, 480)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let sizes: Vec<f64> = data.iter().map(|(_, count)| f64::from(*count)).collect();
        let colors: Vec<RGBColor> = data.iter().map(|(severity, _)| severity_color(*severity)).collect();
        let labels: Vec<String> = data
            .iter()
            .map(|(severity, count)| format!("{} ({count})", severity.label()))
            .collect();

        let center = (320, 240);
        let radius = 160.0;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.donut_hole(80.0);
        pie.label_style(("sans-serif", 18).into_font());

        root.draw(&pie).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
        Ok(ChartOutcome::Written)
    }

    fn per_target_bars(
        &self,
        rows: &[TargetCount],
        out: &Utf8Path,
    ) -> Result<ChartOutcome, ChartError> {
        let mut rows: Vec<&TargetCount> = rows.iter().filter(|r| r.total() > 0).collect();
        if rows.is_empty() {
            debug!(chart = %out, "no per-target data; skipping bar chart");
            return Ok(ChartOutcome::Skipped);
        }
        match self.bar_sort {
            SortOrder::Descending => rows.sort_by(|a, b| {
                b.total().cmp(&a.total()).then_with(|| a.target.cmp(&b.target))
            }),
            SortOrder::Ascending => rows.sort_by(|a, b| {
                a.total().cmp(&b.total()).then_with(|| a.target.cmp(&b.target))
            }),
        }

        ensure_parent(out)?;

        let root = SVGBackend::new(out.as_std_path(), (1280, 720)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let y_max = rows.iter().map(|r| r.total()).max().unwrap_or(1);
        let y_max = y_max + y_max.div_ceil(10);

        let mut chart = ChartBuilder::on(&root)
            .caption("Findings per site", ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(140)
            .y_label_area_size(64)
            .build_cartesian_2d(
                (0i32..rows.len() as i32).into_segmented(),
                0u32..y_max,
            )
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) => rows
                    .get(*i as usize)
                    .map(|r| r.target.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("Findings")
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let x0 = SegmentValue::Exact(i as i32);
                let x1 = SegmentValue::Exact(i as i32 + 1);
                let mut bar =
                    Rectangle::new([(x0, 0u32), (x1, row.total())], RGBColor(0x87, 0xCE, 0xEB).filled());
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
        Ok(ChartOutcome::Written)
    }
}

fn draw_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn out_path(tmp: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().join(name)).expect("utf8 path")
    }

    fn counts(critical: u32, high: u32, medium: u32, low: u32) -> SeverityCounts {
        SeverityCounts {
            critical,
            high,
            medium,
            low,
        }
    }

    #[test]
    fn zero_counts_skip_the_donut_and_write_nothing() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let out = out_path(&tmp, "donut.svg");

        let outcome = SvgChartRenderer::default()
            .severity_donut(&counts(0, 0, 0, 0), &out)
            .expect("render");
        assert_eq!(outcome, ChartOutcome::Skipped);
        assert!(!out.exists());
    }

    #[test]
    fn nonzero_counts_write_exactly_one_artifact() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let out = out_path(&tmp, "charts/donut.svg");

        let outcome = SvgChartRenderer::default()
            .severity_donut(&counts(2, 0, 1, 0), &out)
            .expect("render");
        assert!(outcome.was_written());
        assert!(out.exists());

        let entries = std::fs::read_dir(out.parent().expect("parent"))
            .expect("read dir")
            .count();
        assert_eq!(entries, 1);

        let svg = std::fs::read_to_string(&out).expect("read svg");
        assert!(svg.contains("Critical (2)"));
        assert!(svg.contains("Medium (1)"));
        // Zero-count levels never get a wedge.
        assert!(!svg.contains("High ("));
    }

    #[test]
    fn empty_rows_skip_the_bar_chart() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let out = out_path(&tmp, "bars.svg");

        let renderer = SvgChartRenderer::default();
        let outcome = renderer.per_target_bars(&[], &out).expect("render");
        assert_eq!(outcome, ChartOutcome::Skipped);

        let zero_rows = vec![TargetCount {
            target: "site-a".to_string(),
            counts: counts(0, 0, 0, 0),
        }];
        let outcome = renderer.per_target_bars(&zero_rows, &out).expect("render");
        assert_eq!(outcome, ChartOutcome::Skipped);
        assert!(!out.exists());
    }

    #[test]
    fn bar_chart_lists_every_site_with_data() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let out = out_path(&tmp, "bars.svg");

        let rows = vec![
            TargetCount {
                target: "alpha.example.com".to_string(),
                counts: counts(1, 2, 0, 0),
            },
            TargetCount {
                target: "beta.example.com".to_string(),
                counts: counts(0, 0, 0, 5),
            },
            TargetCount {
                target: "silent.example.com".to_string(),
                counts: counts(0, 0, 0, 0),
            },
        ];

        let outcome = SvgChartRenderer::default()
            .per_target_bars(&rows, &out)
            .expect("render");
        assert!(outcome.was_written());

        let svg = std::fs::read_to_string(&out).expect("read svg");
        assert!(svg.contains("alpha.example.com"));
        assert!(svg.contains("beta.example.com"));
        assert!(!svg.contains("silent.example.com"));
    }
}
