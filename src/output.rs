//! Result types returned by the conversion entry points.

use crate::metadata::PaperMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Properties from the PDF's own information dictionary.
///
/// These are the "container" signals: whatever the authoring tool stored,
/// as opposed to what the classifier reads off the rendered text. Empty
/// strings are normalised to `None` at extraction time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    /// Total pages in the document (0 for pre-extracted text inputs).
    pub page_count: usize,
    /// PDF version as reported by pdfium; empty for text inputs.
    pub pdf_version: String,
}

/// Counters and timings for one converted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Selected pages that produced text.
    pub extracted_pages: usize,
    /// Selected pages whose text layer was empty.
    pub empty_pages: usize,
    /// Lines fed to the classifier.
    pub line_count: usize,
    /// Markdown fragments emitted.
    pub fragment_count: usize,
    /// Byte length of the assembled Markdown.
    pub markdown_bytes: usize,
    /// Lines per classification category, keyed by category name.
    pub categories: BTreeMap<String, usize>,
    pub extract_duration_ms: u64,
    pub classify_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Complete conversion result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled Markdown document.
    pub markdown: String,
    /// The rendered BibTeX entry (always one entry, newline-terminated).
    pub bibtex: String,
    /// Merged container and in-text bibliographic metadata.
    pub metadata: PaperMetadata,
    /// Raw container metadata as read from the PDF.
    pub container: ContainerMetadata,
    pub stats: ConversionStats,
}

/// Paths written by [`crate::convert::convert_to_files`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenDocument {
    /// The input string this document was converted from.
    pub input: String,
    pub markdown_path: PathBuf,
    /// `None` when BibTeX output is disabled.
    pub bibtex_path: Option<PathBuf>,
    pub metadata: PaperMetadata,
    pub stats: ConversionStats,
}
