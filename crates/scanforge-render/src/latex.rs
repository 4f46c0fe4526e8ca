//! LaTeX escaping for body text and the path-safety transform for embedded
//! image references.

use deunicode::deunicode;

/// Extensions the path transform accepts as-is. Anything else gets folded
/// into the file stem and a `.png` default appended.
pub const RECOGNIZED_IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "pdf", "svg"];

/// Escape the markup-control characters `_ % $ & ~ ^ { }` for body text.
///
/// The escape character itself is never touched: literal backslashes are
/// not expected in content, and escaping them would double already-escaped
/// sequences.
pub fn escape_text(text: &str) -> String {
    escape_markup(text)
}

fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '_' => out.push_str("\\_"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo [`escape_markup`]. Applied on entry to the path transform so that
/// feeding the transform its own output is a no-op.
fn unescape_markup(s: &str) -> String {
    s.replace("\\textasciitilde{}", "~")
        .replace("\\textasciicircum{}", "^")
        .replace("\\_", "_")
        .replace("\\%", "%")
        .replace("\\$", "$")
        .replace("\\&", "&")
        .replace("\\{", "{")
        .replace("\\}", "}")
}

/// Make an image reference safe for `\includegraphics`.
///
/// - path separators normalized to `/`
/// - the file name transliterated to ASCII, whitespace replaced by hyphens
/// - stray hyphens before a recognized extension stripped
/// - internal dots folded into hyphens; a `.png` default appended when no
///   recognized extension is present
/// - the markup-control set escaped last
///
/// The transform is pure and idempotent: applying it to its own output
/// yields the same string, and the result always ends in a recognized
/// extension.
pub fn sanitize_image_path(raw: &str) -> String {
    let normalized = unescape_markup(raw).replace('\\', "/");

    let (dir, base) = match normalized.rfind('/') {
        Some(idx) => (Some(&normalized[..idx]), &normalized[idx + 1..]),
        None => (None, normalized.as_str()),
    };

    // Transliteration may introduce whitespace or separators of its own;
    // both fold into hyphens so the name stays a single path segment.
    let base: String = deunicode(base)
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            '/' | '\\' => '-',
            c => c,
        })
        .collect();
    let base = base.trim_end_matches('-');

    let cleaned = match recognized_extension(base) {
        Some(ext) => {
            let stem = &base[..base.len() - ext.len() - 1];
            let stem = stem.replace('.', "-");
            let stem = stem.trim_end_matches('-');
            format!("{stem}.{}", ext.to_ascii_lowercase())
        }
        None => {
            let stem = base.replace('.', "-");
            let stem = stem.trim_end_matches('-');
            format!("{stem}.png")
        }
    };

    let full = match dir {
        Some(dir) => format!("{dir}/{cleaned}"),
        None => cleaned,
    };
    escape_markup(&full)
}

/// The recognized extension `base` ends with, if any (without the dot,
/// original casing).
fn recognized_extension(base: &str) -> Option<&str> {
    let (_, ext) = base.rsplit_once('.')?;
    RECOGNIZED_IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
        .then_some(ext)
}
