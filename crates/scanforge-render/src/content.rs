//! LaTeX content generation from assembled sections.

use crate::latex::{escape_text, sanitize_image_path};
use crate::sections::{DocumentSection, RenderedVulnerability};
use scanforge_types::ScanMode;

/// Mode-specific labels for the generated content. Each mode gets its own
/// annex so the two content blocks can coexist in one document.
#[derive(Clone, Copy, Debug)]
pub struct ContentLayout {
    pub mode: ScanMode,
    pub annex_title: &'static str,
    pub annex_anchor: &'static str,
}

impl ContentLayout {
    pub fn for_mode(mode: ScanMode) -> Self {
        match mode {
            ScanMode::WebApp => ContentLayout {
                mode,
                annex_title: "Annex A",
                annex_anchor: "annexA",
            },
            ScanMode::Infra => ContentLayout {
                mode,
                annex_title: "Annex B",
                annex_anchor: "annexB",
            },
        }
    }
}

/// Render the categorized vulnerability content plus, when any instance
/// list overflowed, the annex section at the end.
pub fn render_content(sections: &[DocumentSection], layout: &ContentLayout) -> String {
    let mut body = String::new();
    let mut annex = String::new();

    for section in sections {
        body.push_str(&format!("%---- category: {} ----\n", section.category));
        body.push_str(&format!(
            "\\subsection{{{}}}\n{}\n\n",
            escape_text(&section.category),
            escape_text(&section.description)
        ));

        for subsection in &section.subsections {
            body.push_str(&format!(
                "\\subsubsection{{{}}}\n{}\n\n",
                escape_text(&subsection.subcategory),
                escape_text(&subsection.description)
            ));
            body.push_str("\\begin{enumerate}\n");
            for vulnerability in &subsection.vulnerabilities {
                render_vulnerability(&mut body, &mut annex, vulnerability, layout);
            }
            body.push_str("\\end{enumerate}\n");
        }
    }

    if !annex.is_empty() {
        body.push_str(&format!(
            "\\section*{{{}}}\n\\label{{{}}}\n",
            layout.annex_title, layout.annex_anchor
        ));
        body.push_str(&annex);
    }

    body
}

fn render_vulnerability(
    body: &mut String,
    annex: &mut String,
    vulnerability: &RenderedVulnerability,
    layout: &ContentLayout,
) {
    let name = escape_text(&vulnerability.name);
    let label = layout.mode.instance_label();

    body.push_str(&format!("\\item \\textbf{{\\texttt{{{name}}}}}\n"));

    if let Some(image) = &vulnerability.image_ref {
        if !image.is_empty() {
            body.push_str(&format!(
                "\\begin{{figure}}[h!]\n\\centering\n\
                 \\includegraphics[width=0.8\\textwidth]{{{}}}\n\
                 \\end{{figure}}\n\\FloatBarrier\n",
                sanitize_image_path(image)
            ));
        }
    }

    body.push_str(&format!(
        "\\textbf{{Description:}} {}\n\n",
        escape_text(&vulnerability.description)
    ));
    body.push_str(&format!(
        "\\textbf{{Remediation:}} {}\n\n",
        escape_text(&vulnerability.remediation)
    ));
    body.push_str(&format!(
        "\\textbf{{Total {label}:}} {}\n\n",
        vulnerability.instances.len()
    ));

    if vulnerability.annex_instances.is_empty() {
        body.push_str(&format!("\\textbf{{{label}:}}\n\\begin{{itemize}}\n"));
        for instance in &vulnerability.inline_instances {
            body.push_str(&format!("    \\item \\url{{{instance}}}\n"));
        }
        body.push_str("\\end{itemize}\n\n");
    } else {
        body.push_str(&format!(
            "\\textbf{{{label} (partial):}}\n\\begin{{itemize}}\n"
        ));
        for instance in &vulnerability.inline_instances {
            body.push_str(&format!("    \\item \\url{{{instance}}}\n"));
        }
        body.push_str("\\end{itemize}\n");
        body.push_str(&format!(
            "The remaining affected instances are listed in \
             \\hyperref[{}]{{{}}}.\\\\[0.5em]\n\n",
            layout.annex_anchor, layout.annex_title
        ));

        annex.push_str(&format!("\\subsubsection*{{{name}}}\n"));
        annex.push_str("\\begin{multicols}{3}\n\\small\n\\begin{itemize}\n");
        for instance in &vulnerability.annex_instances {
            annex.push_str(&format!("    \\item \\url{{{instance}}}\n"));
        }
        annex.push_str("\\end{itemize}\n\\end{multicols}\n\n");
    }
}
