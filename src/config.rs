//! Configuration types for paper-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The classifier's positional heuristics
//! live in their own [`ClassifierConfig`] so the line scan can be driven
//! without the I/O-related knobs.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest; `build()` is the single place where
//! cross-field constraints are validated.

use crate::error::Paper2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic constants for the line classifier.
///
/// The defaults were tuned on two-column conference papers: the title sits in
/// the first handful of extracted lines and author/affiliation blocks never
/// run past line 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Lines (0-based index strictly below this) eligible as the title. Default: 15.
    pub title_window: usize,

    /// Lines (0-based index strictly below this) eligible as author or
    /// affiliation lines. Default: 40.
    pub metadata_window: usize,

    /// Upper bound on the number of lines swallowed after a table caption. Default: 10.
    pub table_skip_max: usize,

    /// Maximum length of the accumulated abstract, in characters. Default: 500.
    pub abstract_max_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            title_window: 15,
            metadata_window: 40,
            table_skip_max: 10,
            abstract_max_chars: 500,
        }
    }
}

/// Configuration for a paper-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use paper2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .title_window(20)
///     .include_front_matter(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.classifier.title_window, 20);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Positional windows and caps used by the line classifier.
    pub classifier: ClassifierConfig,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Prepend YAML front matter with the extracted paper metadata. Default: false.
    pub include_front_matter: bool,

    /// Collapse blank-line runs, trim trailing whitespace and end the
    /// document with one newline. Default: true.
    pub tidy_output: bool,

    /// Write a `.bib` file next to the Markdown in [`crate::convert_to_files`]. Default: true.
    pub write_bibtex: bool,

    /// Documents converted at once by [`crate::batch::convert_batch`]. Default: 4.
    ///
    /// Each document is still scanned strictly line by line; this only
    /// overlaps extraction and file I/O of independent documents.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            pages: PageSelection::default(),
            password: None,
            include_front_matter: false,
            tidy_output: true,
            write_bibtex: true,
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("classifier", &self.classifier)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("include_front_matter", &self.include_front_matter)
            .field("tidy_output", &self.tidy_output)
            .field("write_bibtex", &self.write_bibtex)
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    pub fn title_window(mut self, lines: usize) -> Self {
        self.config.classifier.title_window = lines;
        self
    }

    pub fn metadata_window(mut self, lines: usize) -> Self {
        self.config.classifier.metadata_window = lines;
        self
    }

    pub fn table_skip_max(mut self, lines: usize) -> Self {
        self.config.classifier.table_skip_max = lines;
        self
    }

    pub fn abstract_max_chars(mut self, chars: usize) -> Self {
        self.config.classifier.abstract_max_chars = chars;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn include_front_matter(mut self, v: bool) -> Self {
        self.config.include_front_matter = v;
        self
    }

    pub fn tidy_output(mut self, v: bool) -> Self {
        self.config.tidy_output = v;
        self
    }

    pub fn write_bibtex(mut self, v: bool) -> Self {
        self.config.write_bibtex = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Paper2MdError> {
        let c = &self.config.classifier;
        if c.title_window > c.metadata_window {
            return Err(Paper2MdError::InvalidConfig(format!(
                "title window ({}) must not exceed metadata window ({})",
                c.title_window, c.metadata_window
            )));
        }
        if c.table_skip_max == 0 {
            return Err(Paper2MdError::InvalidConfig(
                "table skip span must be ≥ 1".into(),
            ));
        }
        if c.abstract_max_chars == 0 {
            return Err(Paper2MdError::InvalidConfig(
                "abstract length cap must be ≥ 1".into(),
            ));
        }
        if self.config.concurrency == 0 {
            return Err(Paper2MdError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF contribute text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
