//! Deterministic text cleanup on both sides of the classifier.
//!
//! [`normalise_extracted_text`] runs on provider text before it is split
//! into lines; [`tidy_markdown`] optionally runs on the assembled Markdown.
//! Neither pass changes what a line is classified as: normalisation only
//! removes characters that pdfium leaves in the text layer but which never
//! render, and tidying only touches whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prepare provider text for line classification.
///
/// 1. Normalise line endings (CRLF / lone CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Replace form feeds and NUL bytes with newlines
pub fn normalise_extracted_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    s.replace(['\u{000C}', '\0'], "\n")
}

/// Optional whitespace tidy-up of assembled Markdown.
///
/// 1. Trim trailing whitespace per line
/// 2. Collapse 3+ consecutive blank lines down to 2
/// 3. Ensure the document ends with exactly one newline
pub fn tidy_markdown(input: &str) -> String {
    let s = trim_trailing_whitespace(input);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Line endings ─────────────────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Invisible characters ─────────────────────────────────────────────────────

static RE_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{200B}\u{200C}\u{200D}\u{FEFF}\u{00AD}\u{2060}]").unwrap());

fn remove_invisible_chars(input: &str) -> String {
    RE_INVISIBLE.replace_all(input, "").into_owned()
}

// ── Trailing whitespace ──────────────────────────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Blank-line runs ──────────────────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").into_owned()
}

// ── Final newline ────────────────────────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}
