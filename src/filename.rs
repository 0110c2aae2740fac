//! Output file naming.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Sanitised names are cut to this many characters.
pub const MAX_FILENAME_CHARS: usize = 100;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make `name` safe to use as a file stem.
///
/// Forbidden characters (`<>:"/\|?*`) are dropped as word breaks, runs of
/// whitespace collapse to a single `_`, and the result is cut to
/// [`MAX_FILENAME_CHARS`] characters. Leading and trailing whitespace is
/// trimmed first, so names never start with `_`.
///
/// ```
/// assert_eq!(paper2md::sanitize_filename("My: Paper/Title"), "My_Paper_Title");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { ' ' } else { c })
        .collect();
    let collapsed = RE_WHITESPACE.replace_all(stripped.trim(), "_");
    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

/// File stem for a document's outputs: the sanitised title, or the input's
/// base name when there is no usable title.
pub fn output_stem(title: Option<&str>, input: &str) -> String {
    if let Some(stem) = title.map(sanitize_filename).filter(|s| !s.is_empty()) {
        return stem;
    }
    let base = input
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(input);
    let path = Path::new(base);
    let base = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") || ext.eq_ignore_ascii_case("txt") => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| base.to_string()),
        _ => base.to_string(),
    };
    let stem = sanitize_filename(&base);
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}
