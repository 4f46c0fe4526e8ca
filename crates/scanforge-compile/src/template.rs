//! Template tree preparation and `[KEY]` placeholder substitution.

use crate::CompileError;
use camino::Utf8Path;
use std::collections::BTreeMap;
use tracing::debug;
use walkdir::WalkDir;

/// Copy the document template tree into the output directory.
///
/// Any pre-existing output tree is removed first: every invocation starts
/// from a clean slate, which is what makes re-running a report on the same
/// directory safe.
pub fn prepare_output_tree(template_dir: &Utf8Path, out_dir: &Utf8Path) -> Result<(), CompileError> {
    if !template_dir.is_dir() {
        return Err(CompileError::MissingPrecondition {
            path: template_dir.to_owned(),
        });
    }

    if out_dir.exists() {
        std::fs::remove_dir_all(out_dir).map_err(|source| CompileError::Io {
            context: format!("clear output directory {out_dir}"),
            source,
        })?;
    }

    for entry in WalkDir::new(template_dir) {
        let entry = entry.map_err(|err| CompileError::Io {
            context: format!("walk template {template_dir}"),
            source: err.into(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(template_dir.as_std_path())
            .unwrap_or(entry.path());
        let destination = out_dir.as_std_path().join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination).map_err(|source| CompileError::Io {
                context: format!("create {}", destination.display()),
                source,
            })?;
        } else {
            std::fs::copy(entry.path(), &destination).map_err(|source| CompileError::Io {
                context: format!("copy {}", destination.display()),
                source,
            })?;
        }
    }

    debug!(template = %template_dir, out = %out_dir, "template tree copied");
    Ok(())
}

/// Replace every `[KEY]` token in `content` with its mapped value. Unknown
/// tokens are left alone for the compiler to complain about.
pub fn substitute_placeholders(content: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = content.to_string();
    for (key, value) in values {
        out = out.replace(&format!("[{key}]"), value);
    }
    out
}

/// Substitute placeholders inside one file in place.
pub fn apply_placeholders(
    path: &Utf8Path,
    values: &BTreeMap<String, String>,
) -> Result<(), CompileError> {
    let content = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        context: format!("read {path}"),
        source,
    })?;
    let substituted = substitute_placeholders(&content, values);
    std::fs::write(path, substituted).map_err(|source| CompileError::Io {
        context: format!("write {path}"),
        source,
    })
}
