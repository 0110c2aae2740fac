//! Display-math detection and formatting.
//!
//! A line is treated as an equation when it carries a math indicator and is
//! mostly non-letters, or when it ends with an equation number such as `(3)`.
//! Nothing here parses mathematics; the output is the extracted line wrapped
//! in a `$$` block.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_MATH_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[=+∑∫∏√^_]|[A-Z]\(|\b(?:sin|cos|tan|log|exp|max|min|softmax)\b|[₀-₉]|[⁰¹²³⁴-⁹]",
    )
    .unwrap()
});

static RE_EQUATION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)\s*$").unwrap());

/// Letters-to-symbols ratio below which an indicator line counts as math.
const MAX_LETTER_RATIO: f64 = 0.5;

/// An equation rendered as a Markdown display-math block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEquation {
    /// `$$\n<body>\n$$`, followed by ` (Eq. N)` when numbered.
    pub markdown: String,
    /// The trailing equation number, if the line had one.
    pub number: Option<String>,
}

/// Does `line` (already stripped) look like a displayed equation?
pub fn is_equation(line: &str) -> bool {
    let has_math = RE_MATH_INDICATOR.is_match(line);

    let letters = line.chars().filter(char::is_ascii_alphabetic).count();
    let total = line.chars().filter(|&c| c != ' ').count();

    if total > 0 && has_math && (letters as f64 / total as f64) < MAX_LETTER_RATIO {
        return true;
    }

    RE_EQUATION_NUMBER.is_match(line.trim())
}

/// Wrap an equation line in display math, moving a trailing `(N)` into an
/// `(Eq. N)` suffix.
pub fn format_equation(line: &str) -> FormattedEquation {
    let line = line.trim();

    let (body, number) = match RE_EQUATION_NUMBER.captures(line) {
        Some(caps) => {
            let start = caps.get(0).map_or(line.len(), |m| m.start());
            (line[..start].trim(), Some(caps[1].to_string()))
        }
        None => (line, None),
    };

    let mut markdown = format!("$$\n{body}\n$$");
    if let Some(ref n) = number {
        markdown.push_str(&format!(" (Eq. {n})"));
    }

    FormattedEquation { markdown, number }
}
