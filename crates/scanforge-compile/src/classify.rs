//! Compiler-log classification.
//!
//! Pattern matching against one compiler's exact phrasing is fragile by
//! nature, so the signature set lives behind this narrow interface and is
//! tested on canned logs independently of the rest of the driver.

use regex::Regex;
use std::sync::LazyLock;

/// Matches the image-inclusion failure signatures:
///
/// ```text
/// ! LaTeX Error: File `assets/foo.png' not found.
/// ! Package pdftex.def Error: File `foo.png' not found: using draft setting.
/// ```
static IMAGE_NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)! (?:LaTeX|Package .+?\.def) Error: File `([^']+)' not found")
        .expect("image signature pattern is valid")
});

/// File names the compiler reported as unresolvable image inclusions,
/// deduplicated in first-seen order.
pub fn missing_asset_files(log: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for captures in IMAGE_NOT_FOUND.captures_iter(log) {
        if let Some(name) = captures.get(1) {
            let name = name.as_str().to_string();
            if !files.contains(&name) {
                files.push(name);
            }
        }
    }
    files
}
