//! The compilation driver: copy the document template, substitute
//! placeholders, run the external typesetting compiler twice, and classify
//! what happened from its combined log.
//!
//! The driver never retries beyond the fixed two passes, and it is not safe
//! to call twice on one output directory without re-preparing: the template
//! copy step wipes prior state so every invocation starts from a clean
//! slate.

#![forbid(unsafe_code)]

mod classify;
mod driver;
mod template;

use camino::Utf8PathBuf;

pub use classify::missing_asset_files;
pub use driver::{compile_document, CompileOutput, CompilerInvocation, FailureReason, PREAMBLE_FILE};
pub use template::{apply_placeholders, prepare_output_tree, substitute_placeholders};

/// Environment-level problems around the compiler run (as opposed to a
/// classified compiler failure, which is data in [`CompileOutput`]).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A required template asset is absent. Fatal before the compiler is
    /// ever invoked.
    #[error("required template asset missing: {path}")]
    MissingPrecondition { path: Utf8PathBuf },
    #[error("spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
