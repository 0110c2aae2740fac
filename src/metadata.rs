//! Bibliographic metadata accumulated while a paper is scanned.
//!
//! [`MetadataExtractor`] owns the mutable [`PaperMetadata`] record for one
//! document. Container-level properties (the PDF information dictionary) are
//! recorded first, before the line scan starts; the classifier then offers
//! in-text candidates which only back-fill fields that are still unset.

use crate::output::ContainerMetadata;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Bibliographic record for one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: Option<String>,
    /// Author names in first-seen order, never containing exact duplicates.
    pub authors: Vec<String>,
    /// Four-digit publication year.
    pub year: Option<String>,
    /// Affiliation or venue line.
    pub venue: Option<String>,
    /// Abstract text, capped at the configured character limit.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Never populated by the classifier; carried for consumers of the record.
    pub keywords: Vec<String>,
}

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").unwrap());

static RE_AUTHOR_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:[;,&]|\band\b)\s*").unwrap());

/// First run of four ASCII digits, e.g. `"D:20230115093000Z"` → `"2023"`.
pub fn year_from_date(date: &str) -> Option<String> {
    RE_YEAR.find(date).map(|m| m.as_str().to_string())
}

/// Mutable metadata record threaded through a document scan.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    metadata: PaperMetadata,
    abstract_max_chars: usize,
    container_authors: bool,
}

impl MetadataExtractor {
    pub fn new(abstract_max_chars: usize) -> Self {
        Self {
            metadata: PaperMetadata::default(),
            abstract_max_chars,
            container_authors: false,
        }
    }

    /// Start from the container properties of a document.
    pub fn with_container(container: &ContainerMetadata, abstract_max_chars: usize) -> Self {
        let mut extractor = Self::new(abstract_max_chars);
        extractor.record_container(container);
        extractor
    }

    /// Record container-level title, author and creation date.
    ///
    /// Called once, before the line scan. Blank values are ignored so they
    /// do not block in-text back-fill.
    pub fn record_container(&mut self, container: &ContainerMetadata) {
        if let Some(title) = non_blank(container.title.as_deref()) {
            self.metadata.title = Some(title.to_string());
        }

        if let Some(author) = non_blank(container.author.as_deref()) {
            for name in RE_AUTHOR_SEP.split(author) {
                let name = name.trim();
                if !name.is_empty() && !self.metadata.authors.iter().any(|a| a == name) {
                    self.metadata.authors.push(name.to_string());
                }
            }
            self.container_authors = !self.metadata.authors.is_empty();
        }

        if let Some(year) = container.creation_date.as_deref().and_then(year_from_date) {
            self.metadata.year = Some(year);
        }
    }

    /// Offer an in-text title. Returns `true` if it was recorded.
    pub fn offer_title(&mut self, title: &str) -> bool {
        if self.metadata.title.is_some() {
            return false;
        }
        self.metadata.title = Some(title.to_string());
        true
    }

    /// Offer in-text author names, appended in order and skipping exact
    /// duplicates. Ignored entirely when the container supplied authors.
    pub fn offer_authors<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.container_authors {
            return;
        }
        for name in names {
            let name = name.into();
            if !self.metadata.authors.contains(&name) {
                self.metadata.authors.push(name);
            }
        }
    }

    /// Offer an affiliation/venue line. Returns `true` if it was recorded.
    pub fn offer_venue(&mut self, venue: &str) -> bool {
        if self.metadata.venue.is_some() {
            return false;
        }
        self.metadata.venue = Some(venue.to_string());
        true
    }

    /// Append a line of abstract text, space-joined.
    ///
    /// Once the abstract reaches the character cap it stops growing.
    pub fn append_abstract(&mut self, line: &str) {
        let cap = self.abstract_max_chars;
        let current = self.metadata.abstract_text.take().unwrap_or_default();
        if current.chars().count() >= cap {
            self.metadata.abstract_text = Some(current);
            return;
        }
        let joined = if current.is_empty() {
            line.to_string()
        } else {
            format!("{current} {line}")
        };
        self.metadata.abstract_text = Some(joined.chars().take(cap).collect());
    }

    pub fn metadata(&self) -> &PaperMetadata {
        &self.metadata
    }

    pub fn into_metadata(self) -> PaperMetadata {
        self.metadata
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(title: Option<&str>, author: Option<&str>, date: Option<&str>) -> ContainerMetadata {
        ContainerMetadata {
            title: title.map(String::from),
            author: author.map(String::from),
            creation_date: date.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn year_is_first_four_digit_run() {
        assert_eq!(year_from_date("D:20230115093000Z").as_deref(), Some("2023"));
        assert_eq!(year_from_date("2019-06-01").as_deref(), Some("2019"));
        assert_eq!(year_from_date("June 95"), None);
    }

    #[test]
    fn container_title_is_never_overwritten() {
        let mut m = MetadataExtractor::with_container(&container(Some("Container Title"), None, None), 500);
        assert!(!m.offer_title("In Text Title Of The Paper"));
        assert_eq!(m.metadata().title.as_deref(), Some("Container Title"));
    }

    #[test]
    fn blank_container_title_allows_back_fill() {
        let mut m = MetadataExtractor::with_container(&container(Some("   "), None, None), 500);
        assert!(m.offer_title("In Text Title Of The Paper"));
        assert_eq!(m.metadata().title.as_deref(), Some("In Text Title Of The Paper"));
    }

    #[test]
    fn container_authors_block_in_text_authors() {
        let mut m = MetadataExtractor::with_container(
            &container(None, Some("Ada Lovelace; Charles Babbage and Mary Somerville"), None),
            500,
        );
        m.offer_authors(["Someone Else"]);
        assert_eq!(
            m.metadata().authors,
            vec!["Ada Lovelace", "Charles Babbage", "Mary Somerville"]
        );
    }

    #[test]
    fn in_text_authors_deduplicate() {
        let mut m = MetadataExtractor::new(500);
        m.offer_authors(["Alice Smith", "Bob Jones"]);
        m.offer_authors(["Bob Jones", "Carol White"]);
        assert_eq!(m.metadata().authors, vec!["Alice Smith", "Bob Jones", "Carol White"]);
    }

    #[test]
    fn container_date_sets_year() {
        let m = MetadataExtractor::with_container(&container(None, None, Some("D:20170612")), 500);
        assert_eq!(m.metadata().year.as_deref(), Some("2017"));
    }

    #[test]
    fn venue_first_wins() {
        let mut m = MetadataExtractor::new(500);
        assert!(m.offer_venue("Google Brain"));
        assert!(!m.offer_venue("University of Toronto"));
        assert_eq!(m.metadata().venue.as_deref(), Some("Google Brain"));
    }

    #[test]
    fn abstract_grows_then_freezes_at_cap() {
        let mut m = MetadataExtractor::new(20);
        m.append_abstract("We study things.");
        assert_eq!(m.metadata().abstract_text.as_deref(), Some("We study things."));
        m.append_abstract("More words here");
        let after_cap = m.metadata().abstract_text.clone().unwrap();
        assert_eq!(after_cap.chars().count(), 20);
        assert_eq!(after_cap, "We study things. Mor");
        m.append_abstract("ignored");
        assert_eq!(m.metadata().abstract_text.as_deref(), Some(after_cap.as_str()));
    }
}
