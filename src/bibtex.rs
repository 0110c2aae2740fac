//! BibTeX generation from [`PaperMetadata`].
//!
//! The mapping is deterministic apart from one input: when the record has no
//! year, the cite key falls back to the current calendar year.

use crate::metadata::PaperMetadata;
use chrono::Datelike;
use std::fmt;

/// At most this many authors are written to the `author` field.
pub const MAX_AUTHORS: usize = 8;

/// Abstracts longer than this are truncated in the entry.
const ABSTRACT_LIMIT: usize = 500;

/// BibTeX entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Article,
    InProceedings,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Article => "article",
            EntryType::InProceedings => "inproceedings",
        }
    }
}

/// A single bibliography entry derived from a metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexEntry {
    pub entry_type: EntryType,
    pub cite_key: String,
    /// Fields in output order; absent source values produce no field.
    pub fields: Vec<(&'static str, String)>,
}

impl BibtexEntry {
    /// Build an entry, using `current_year` for the cite key when the record has no year.
    pub fn from_metadata(meta: &PaperMetadata, current_year: i32) -> Self {
        let entry_type = if meta.venue.is_some() {
            EntryType::InProceedings
        } else {
            EntryType::Article
        };

        let first_author = meta.authors.first().map(String::as_str).unwrap_or("Unknown");
        let last_name = first_author.split_whitespace().last().unwrap_or("Unknown");
        let year = meta
            .year
            .clone()
            .unwrap_or_else(|| current_year.to_string());
        let cite_key: String = format!("{last_name}{year}")
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();

        let mut fields = Vec::new();
        if let Some(ref title) = meta.title {
            fields.push(("title", title.clone()));
        }
        if !meta.authors.is_empty() {
            let authors: Vec<&str> = meta
                .authors
                .iter()
                .take(MAX_AUTHORS)
                .map(String::as_str)
                .collect();
            fields.push(("author", authors.join(" and ")));
        }
        if let Some(ref y) = meta.year {
            fields.push(("year", y.clone()));
        }
        if let Some(ref venue) = meta.venue {
            let name = match entry_type {
                EntryType::InProceedings => "booktitle",
                EntryType::Article => "journal",
            };
            fields.push((name, venue.clone()));
        }
        if let Some(ref text) = meta.abstract_text {
            fields.push(("abstract", clean_abstract(text)));
        }

        Self {
            entry_type,
            cite_key,
            fields,
        }
    }
}

impl fmt::Display for BibtexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@{}{{{},", self.entry_type.as_str(), self.cite_key)?;
        for (name, value) in &self.fields {
            writeln!(f, "  {name} = {{{value}}},")?;
        }
        writeln!(f, "}}")
    }
}

/// Strip braces and truncate to 497 characters plus `...` when over the limit.
fn clean_abstract(text: &str) -> String {
    let stripped: String = text.chars().filter(|&c| c != '{' && c != '}').collect();
    if stripped.chars().count() > ABSTRACT_LIMIT {
        let head: String = stripped.chars().take(ABSTRACT_LIMIT - 3).collect();
        format!("{head}...")
    } else {
        stripped
    }
}

/// Render the BibTeX entry for `meta`, defaulting the year to today's.
pub fn generate_bibtex(meta: &PaperMetadata) -> String {
    let current_year = chrono::Local::now().year();
    BibtexEntry::from_metadata(meta, current_year).to_string()
}
