//! Line-by-line structural classification of extracted paper text.
//!
//! Every line gets exactly one [`Category`]. The checks run in a fixed
//! priority order and the first match wins:
//!
//! ```text
//!  0. table body   (inside a skip window opened by a caption)
//!  1. blank
//!  2. title        (index < title_window, title not yet found)
//!  3. author / affiliation (index < metadata_window, before "Abstract")
//!  4. abstract heading
//!  5. abstract body → side effect only, never consumes the line
//!  6. table caption
//!  7. equation
//!  8. section
//!  9. subsection
//! 10. bullet
//! 11. paragraph text (buffered)
//! ```
//!
//! All scan state lives in [`Scan`], passed by `&mut` into
//! [`LineClassifier::step`]; the classifier itself only holds configuration.

use super::equation::{format_equation, is_equation};
use super::paragraph::ParagraphAccumulator;
use super::table::detect_table;
use crate::config::ClassifierConfig;
use crate::metadata::{MetadataExtractor, PaperMetadata};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const TITLE_EXCLUSIONS: &[&str] = &["university", "google", "research", "brain", "department"];

const INSTITUTION_MARKERS: &[&str] = &[
    "@",
    "university",
    "institute",
    "google",
    "deepmind",
    "research",
    "brain",
    "department",
    "college",
    ".com",
    ".edu",
];

const CONTENT_MARKERS: &[&str] = &[
    "abstract",
    "introduction",
    "recurrent",
    "neural network",
    "the ",
    "based on",
    "we propose",
];

/// Line prefixes that never extend the abstract.
const ABSTRACT_STOP_PREFIXES: &[&str] = &["introduction", "1 ", "2 "];

static RE_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.?\s+)?([A-Z][A-Za-z\s&-]+)$").unwrap());

static RE_NUMBERED_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+[A-Z]").unwrap());

static RE_SUBSECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+\S").unwrap());

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-\*]\s+").unwrap());

static RE_AUTHOR_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r",|\s{2,}").unwrap());

/// One input line.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// 0-based position in the document.
    pub index: usize,
    pub raw: &'a str,
    /// `raw` without surrounding whitespace.
    pub stripped: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(index: usize, raw: &'a str) -> Self {
        Self {
            index,
            raw,
            stripped: raw.trim(),
        }
    }
}

/// Running state of a document scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// True until the "Abstract" heading; title/author/affiliation capture
    /// only happens while it is set.
    pub metadata_section: bool,
    pub in_abstract: bool,
    /// Set at a references heading. Nothing reads it yet.
    pub in_references: bool,
    /// Remaining lines of the current table-body skip window.
    pub skip_lines: usize,
    pub title_found: bool,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            metadata_section: true,
            in_abstract: false,
            in_references: false,
            skip_lines: 0,
            title_found: false,
        }
    }
}

/// What a line was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Blank,
    Title,
    Author,
    Affiliation,
    AbstractHeading,
    TableCaption,
    TableBody,
    Equation,
    Section,
    Subsection,
    Bullet,
    Paragraph,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Blank => "blank",
            Category::Title => "title",
            Category::Author => "author",
            Category::Affiliation => "affiliation",
            Category::AbstractHeading => "abstract_heading",
            Category::TableCaption => "table_caption",
            Category::TableBody => "table_body",
            Category::Equation => "equation",
            Category::Section => "section",
            Category::Subsection => "subsection",
            Category::Bullet => "bullet",
            Category::Paragraph => "paragraph",
        }
    }
}

/// One rendered piece of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub category: Category,
    /// Index of the source line (first line of the run for paragraphs).
    pub line: usize,
    pub text: String,
}

impl Fragment {
    pub fn new(category: Category, line: usize, text: impl Into<String>) -> Self {
        Self {
            category,
            line,
            text: text.into(),
        }
    }
}

/// Result of classifying one line: its category and the fragments it
/// released, including any paragraph text it flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub category: Category,
    pub fragments: Vec<Fragment>,
}

/// Everything mutated while scanning one document.
#[derive(Debug, Clone)]
pub struct Scan {
    pub state: DocumentState,
    pub metadata: MetadataExtractor,
    pub paragraphs: ParagraphAccumulator,
}

impl Scan {
    pub fn new(metadata: MetadataExtractor) -> Self {
        Self {
            state: DocumentState::default(),
            metadata,
            paragraphs: ParagraphAccumulator::new(),
        }
    }
}

/// The per-line classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineClassifier {
    config: ClassifierConfig,
}

impl LineClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify `line` and apply its effects to `scan`.
    ///
    /// `total_lines` is the length of the whole document, needed for the
    /// table skip window.
    pub fn step(&self, scan: &mut Scan, line: &Line<'_>, total_lines: usize) -> Step {
        let state = &mut scan.state;

        if state.skip_lines > 0 {
            state.skip_lines -= 1;
            return Step {
                category: Category::TableBody,
                fragments: Vec::new(),
            };
        }

        let s = line.stripped;
        let index = line.index;

        if s.is_empty() {
            if !scan.paragraphs.is_empty() {
                scan.paragraphs.push_separator(index);
            }
            return Step {
                category: Category::Blank,
                fragments: Vec::new(),
            };
        }

        let lower = s.to_lowercase();
        let len = s.chars().count();

        if state.metadata_section
            && !state.title_found
            && index < self.config.title_window
            && is_title_candidate(s, &lower, len)
        {
            scan.metadata.offer_title(s);
            state.title_found = true;
            return flushed(scan, Category::Title, None);
        }

        if index < self.config.metadata_window && state.metadata_section {
            let is_institution = contains_any(&lower, INSTITUTION_MARKERS);
            let is_content = contains_any(&lower, CONTENT_MARKERS);

            if state.title_found && !is_institution && !is_content && len > 5 && len < 150 {
                scan.metadata.offer_authors(split_author_names(s));
                return flushed(scan, Category::Author, None);
            } else if is_institution && !is_content {
                if !s.contains('@') {
                    scan.metadata.offer_venue(s);
                }
                if len < 200 {
                    return flushed(scan, Category::Affiliation, None);
                }
            }
        }

        if lower == "abstract" {
            state.metadata_section = false;
            state.in_abstract = true;
            let heading = Fragment::new(Category::AbstractHeading, index, "\n## Abstract\n\n");
            return flushed(scan, Category::AbstractHeading, Some(heading));
        }

        if state.in_abstract {
            if is_major_section(s) {
                state.in_abstract = false;
            } else if !ABSTRACT_STOP_PREFIXES.iter().any(|p| lower.starts_with(p)) {
                scan.metadata.append_abstract(s);
            }
        }

        if let Some(skip) = detect_table(line.raw, index, total_lines, self.config.table_skip_max) {
            state.skip_lines = skip;
            let caption = Fragment::new(Category::TableCaption, index, format!("\n**{s}**\n\n"));
            return flushed(scan, Category::TableCaption, Some(caption));
        }

        if is_equation(s) {
            let eq = format_equation(s);
            let fragment = Fragment::new(Category::Equation, index, format!("\n{}\n\n", eq.markdown));
            return flushed(scan, Category::Equation, Some(fragment));
        }

        if is_major_section(s) {
            if lower.contains("reference") {
                state.in_references = true;
            }
            let heading = Fragment::new(Category::Section, index, format!("\n## {s}\n\n"));
            return flushed(scan, Category::Section, Some(heading));
        }

        if RE_SUBSECTION.is_match(s) {
            let heading = Fragment::new(Category::Subsection, index, format!("\n### {s}\n\n"));
            return flushed(scan, Category::Subsection, Some(heading));
        }

        if RE_BULLET.is_match(s) {
            let item = Fragment::new(Category::Bullet, index, format!("{s}\n"));
            return flushed(scan, Category::Bullet, Some(item));
        }

        scan.paragraphs.push_line(index, s);
        Step {
            category: Category::Paragraph,
            fragments: Vec::new(),
        }
    }

    /// Flush buffered paragraph text at end of input.
    pub fn finish(&self, scan: &mut Scan) -> Vec<Fragment> {
        scan.paragraphs.flush()
    }
}

/// Flush pending paragraphs, then append this line's own fragment.
fn flushed(scan: &mut Scan, category: Category, own: Option<Fragment>) -> Step {
    let mut fragments = scan.paragraphs.flush();
    fragments.extend(own);
    Step { category, fragments }
}

/// Output of [`classify_document`].
#[derive(Debug, Clone)]
pub struct ClassifiedDocument {
    /// Fragments in source order.
    pub fragments: Vec<Fragment>,
    /// One category per input line.
    pub categories: Vec<Category>,
    pub metadata: PaperMetadata,
    /// State after the final line.
    pub state: DocumentState,
}

impl ClassifiedDocument {
    /// Concatenate fragment texts into the raw Markdown body.
    pub fn markdown(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scan a whole document. `metadata` should already hold any container
/// properties so in-text values only back-fill.
pub fn classify_document(
    text: &str,
    metadata: MetadataExtractor,
    config: &ClassifierConfig,
) -> ClassifiedDocument {
    let lines: Vec<&str> = text.split('\n').collect();
    let total = lines.len();
    let classifier = LineClassifier::new(*config);
    let mut scan = Scan::new(metadata);

    let mut fragments = Vec::new();
    let mut categories = Vec::with_capacity(total);

    for (index, raw) in lines.iter().enumerate() {
        let step = classifier.step(&mut scan, &Line::new(index, raw), total);
        categories.push(step.category);
        fragments.extend(step.fragments);
    }
    fragments.extend(classifier.finish(&mut scan));

    ClassifiedDocument {
        fragments,
        categories,
        metadata: scan.metadata.into_metadata(),
        state: scan.state,
    }
}

// ── Predicates ───────────────────────────────────────────────────────────

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Title case: every cased run starts with an uppercase letter followed only
/// by lowercase letters, and there is at least one cased character.
pub(crate) fn is_title_case(s: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

/// At least one cased character and no lowercase ones.
pub(crate) fn is_all_uppercase(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

fn is_title_candidate(s: &str, lower: &str, len: usize) -> bool {
    let starts_upper = s.chars().next().is_some_and(char::is_uppercase);
    len > 15
        && (is_title_case(s) || (starts_upper && !is_all_uppercase(s)))
        && !s.contains('@')
        && !contains_any(lower, TITLE_EXCLUSIONS)
}

/// Numbered or capitalised short heading, e.g. `"3 Model"`, `"RESULTS"`,
/// `"Related Work"`.
pub fn is_major_section(s: &str) -> bool {
    let len = s.chars().count();
    if len >= 80 || !RE_SECTION.is_match(s) {
        return false;
    }
    is_all_uppercase(s) || RE_NUMBERED_SECTION.is_match(s) || (len < 50 && is_title_case(s))
}

/// Candidate author names on a line: comma- or wide-gap-separated tokens
/// that are alphabetic (ignoring spaces, dots and hyphens) and longer than
/// three letters.
fn split_author_names(s: &str) -> Vec<String> {
    RE_AUTHOR_SPLIT
        .split(s)
        .map(str::trim)
        .filter(|token| {
            let cleaned: String = token
                .chars()
                .filter(|&c| c != ' ' && c != '.' && c != '-')
                .collect();
            cleaned.chars().count() > 3 && cleaned.chars().all(char::is_alphabetic)
        })
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(lines: &[&str]) -> ClassifiedDocument {
        classify_with(lines, ClassifierConfig::default())
    }

    fn classify_with(lines: &[&str], config: ClassifierConfig) -> ClassifiedDocument {
        classify_document(&lines.join("\n"), MetadataExtractor::new(config.abstract_max_chars), &config)
    }

    /// Windows closed: no title/author capture, so body rules can be tested alone.
    fn body_only() -> ClassifierConfig {
        ClassifierConfig {
            title_window: 0,
            metadata_window: 0,
            ..ClassifierConfig::default()
        }
    }

    #[test]
    fn title_case_rules() {
        assert!(is_title_case("Attention Is All You Need"));
        assert!(is_title_case("Table 1: Results"));
        assert!(!is_title_case("Attention is all you need"));
        assert!(!is_title_case("BERT Pretraining"));
        assert!(!is_title_case("1234"));
        assert!(is_all_uppercase("RELATED WORK 2"));
        assert!(!is_all_uppercase("2 3"));
    }

    #[test]
    fn every_line_gets_one_category() {
        let lines = [
            "Learning To Parse Scientific Papers",
            "Alice Smith, Bob Jones",
            "Department of Computing, Example University",
            "",
            "Abstract",
            "we parse papers.",
            "1 Introduction",
            "Plain text here.",
            "E = mc^2 (1)",
            "Table 1: Results",
            "a 1 2",
            "b 3 4",
            "",
            "3.1 Setup",
            "• a bullet",
        ];
        let doc = classify(&lines);
        assert_eq!(doc.categories.len(), lines.len());
        assert_eq!(
            doc.categories,
            vec![
                Category::Title,
                Category::Author,
                Category::Affiliation,
                Category::Blank,
                Category::AbstractHeading,
                Category::Paragraph,
                Category::Section,
                Category::Paragraph,
                Category::Equation,
                Category::TableCaption,
                Category::TableBody,
                Category::TableBody,
                Category::TableBody,
                Category::TableBody,
                Category::TableBody,
            ]
        );
    }

    #[test]
    fn table_caption_swallows_following_lines() {
        let doc = classify_with(&["Table 1: Results", "r1", "r2", "r3", "after"], body_only());
        assert_eq!(doc.categories[0], Category::TableCaption);
        assert_eq!(&doc.categories[1..], &[Category::TableBody; 4]);
        assert_eq!(doc.fragments.len(), 1);
        assert_eq!(doc.fragments[0].text, "\n**Table 1: Results**\n\n");
    }

    #[test]
    fn table_skip_window_is_capped() {
        let mut lines = vec!["Table 2: Scores"];
        lines.extend(std::iter::repeat_n("row", 12));
        lines.push("Closing prose line.");
        let doc = classify_with(&lines, body_only());
        let swallowed = doc.categories.iter().filter(|c| **c == Category::TableBody).count();
        assert_eq!(swallowed, 10);
        assert_eq!(doc.categories[11], Category::Paragraph);
        assert_eq!(doc.state.skip_lines, 0);
    }

    #[test]
    fn equation_fragment() {
        let doc = classify_with(&["E = mc^2 (1)"], body_only());
        assert_eq!(doc.categories, vec![Category::Equation]);
        assert_eq!(doc.fragments[0].text, "\n$$\nE = mc^2\n$$ (Eq. 1)\n\n");
    }

    #[test]
    fn authors_captured_once_inside_window() {
        let mut lines = vec!["Attention Is All You Need Today"];
        lines.extend(std::iter::repeat_n("", 19));
        lines.push("Alice Smith, Bob Jones");
        lines.extend(std::iter::repeat_n("", 4));
        lines.push("Alice Smith, Bob Jones");
        let doc = classify(&lines);
        assert_eq!(doc.categories[20], Category::Author);
        assert_eq!(doc.categories[25], Category::Author);
        assert_eq!(doc.metadata.authors, vec!["Alice Smith", "Bob Jones"]);
        assert_eq!(doc.metadata.title.as_deref(), Some("Attention Is All You Need Today"));
    }

    #[test]
    fn author_capture_stops_at_metadata_window() {
        let mut lines = vec!["Attention Is All You Need Today"];
        lines.extend(std::iter::repeat_n("", 39));
        lines.push("Carol White, Dan Brown");
        let doc = classify(&lines);
        assert_ne!(doc.categories[40], Category::Author);
        assert!(doc.metadata.authors.is_empty());
    }

    #[test]
    fn short_author_tokens_are_dropped() {
        assert_eq!(
            split_author_names("Jean-Luc Picard,  Li,  J. R. R. Tolkien, Bob2"),
            vec!["Jean-Luc Picard", "J. R. R. Tolkien"]
        );
    }

    #[test]
    fn affiliation_sets_venue_but_not_email() {
        let doc = classify(&[
            "Attention Is All You Need Today",
            "alice@example.edu",
            "Google Brain",
            "Abstract",
        ]);
        assert_eq!(doc.categories[1], Category::Affiliation);
        assert_eq!(doc.categories[2], Category::Affiliation);
        assert_eq!(doc.metadata.venue.as_deref(), Some("Google Brain"));
    }

    #[test]
    fn institution_lines_before_title_are_affiliations() {
        let doc = classify(&["Google Research", "Attention Is All You Need Today"]);
        assert_eq!(doc.categories, vec![Category::Affiliation, Category::Title]);
    }

    #[test]
    fn abstract_heading_ends_metadata_section() {
        let doc = classify(&[
            "Attention Is All You Need Today",
            "Abstract",
            "Alice Smith, Bob Jones",
        ]);
        assert!(!doc.state.metadata_section);
        assert!(doc.state.in_abstract);
        assert_eq!(doc.categories[2], Category::Paragraph);
        assert!(doc.metadata.authors.is_empty());
        assert_eq!(doc.fragments[0].text, "\n## Abstract\n\n");
    }

    #[test]
    fn no_title_capture_after_abstract_heading() {
        let doc = classify(&[
            "Abstract",
            "We propose a novel method for parsing papers.",
            "1 Introduction",
        ]);
        assert_eq!(
            doc.categories,
            vec![Category::AbstractHeading, Category::Paragraph, Category::Section]
        );
        assert!(doc.metadata.title.is_none());
        assert!(!doc.state.title_found);
        assert_eq!(
            doc.metadata.abstract_text.as_deref(),
            Some("We propose a novel method for parsing papers.")
        );
        assert!(doc.markdown().contains("We propose a novel method for parsing papers.\n"));
    }

    #[test]
    fn abstract_body_accumulates_until_section() {
        let doc = classify(&[
            "ABSTRACT",
            "we study line classifiers.",
            "they are heuristic.",
            "1 Introduction",
            "not part of the abstract.",
        ]);
        assert_eq!(
            doc.metadata.abstract_text.as_deref(),
            Some("we study line classifiers. they are heuristic.")
        );
        assert!(!doc.state.in_abstract);
        assert_eq!(doc.categories[3], Category::Section);
    }

    #[test]
    fn abstract_stops_growing_at_cap() {
        let sentence = "this sentence keeps the abstract growing well past any sane limit for testing";
        let mut lines = vec!["Abstract"];
        lines.extend(std::iter::repeat_n(sentence, 12));
        let doc = classify(&lines);
        let abs = doc.metadata.abstract_text.unwrap();
        assert_eq!(abs.chars().count(), 500);
        assert!(doc.state.in_abstract);
    }

    #[test]
    fn references_heading_sets_flag() {
        let doc = classify_with(&["REFERENCES", "[1] Some citation."], body_only());
        assert_eq!(doc.categories[0], Category::Section);
        assert!(doc.state.in_references);
        assert_eq!(doc.fragments[0].text, "\n## REFERENCES\n\n");
    }

    #[test]
    fn subsection_and_bullets() {
        let doc = classify_with(&["3.1 Model Architecture", "- first item", "* second", "• third"], body_only());
        assert_eq!(
            doc.categories,
            vec![Category::Subsection, Category::Bullet, Category::Bullet, Category::Bullet]
        );
        assert_eq!(doc.fragments[0].text, "\n### 3.1 Model Architecture\n\n");
        assert_eq!(doc.fragments[1].text, "- first item\n");
    }

    #[test]
    fn undotted_numbered_lines_are_subsections() {
        let doc = classify_with(&["2. we show the results", "4 lowercase heading text"], body_only());
        assert_eq!(doc.categories, vec![Category::Subsection, Category::Subsection]);
        assert_eq!(doc.fragments[1].text, "\n### 4 lowercase heading text\n\n");
    }

    #[test]
    fn paragraphs_flush_before_headings() {
        let doc = classify_with(
            &["some text", "more text", "", "next run", "2 Background", "tail"],
            body_only(),
        );
        let texts: Vec<&str> = doc.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "some text more text\n",
                "\n",
                "next run\n",
                "\n## 2 Background\n\n",
                "tail\n"
            ]
        );
        assert_eq!(
            doc.markdown(),
            "some text more text\n\n\n\nnext run\n\n\n## 2 Background\n\n\ntail\n"
        );
    }

    #[test]
    fn leading_blank_lines_are_ignored() {
        let doc = classify_with(&["", "", "text"], body_only());
        assert_eq!(doc.fragments.len(), 1);
        assert_eq!(doc.categories[..2], [Category::Blank, Category::Blank]);
    }

    #[test]
    fn container_title_survives_in_text_title() {
        let container = crate::output::ContainerMetadata {
            title: Some("From The Container".into()),
            ..Default::default()
        };
        let config = ClassifierConfig::default();
        let doc = classify_document(
            "Attention Is All You Need Today\nAbstract",
            MetadataExtractor::with_container(&container, config.abstract_max_chars),
            &config,
        );
        assert_eq!(doc.categories[0], Category::Title);
        assert!(doc.state.title_found);
        assert_eq!(doc.metadata.title.as_deref(), Some("From The Container"));
    }
}
