//! The taxonomy matcher and content assembler: joins aggregates with the
//! catalog, groups and orders them into document sections, and renders the
//! categorized LaTeX content plus the overflow annex.

#![forbid(unsafe_code)]

mod content;
mod latex;
mod sections;

pub use content::{render_content, ContentLayout};
pub use latex::{escape_text, sanitize_image_path, RECOGNIZED_IMAGE_EXTENSIONS};
pub use sections::{
    assemble_sections, Assembly, AssemblyOptions, DocumentSection, DocumentSubsection,
    RenderedVulnerability,
};
