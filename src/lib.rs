//! # paper2md
//!
//! Convert academic-paper PDFs into structured Markdown plus a BibTeX entry.
//!
//! ## How it works
//!
//! pdfium extracts each page's text layer. A single-pass, heuristic line
//! classifier then decides for every line whether it is the title, an
//! author or affiliation line, the abstract, a section heading, an
//! equation, a table caption, a bullet, or plain paragraph text. While it
//! scans it fills in the paper's bibliographic metadata, which is rendered
//! as one BibTeX entry.
//!
//! The classifier is best-effort: it never fails on odd input, and a line
//! that matches nothing is simply paragraph text. Mathematics and tables
//! are not parsed; equations are wrapped verbatim in `$$` blocks and table
//! bodies are dropped behind their bold caption.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / .txt / URL
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Extract   page text + container metadata via pdfium (spawn_blocking)
//!  ├─ 3. Classify  one category per line, metadata side effects
//!  ├─ 4. Assemble  fragments → Markdown (optional front matter + tidy)
//!  └─ 5. Output    <title>.md + <title>.bib
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paper2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("attention.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     println!("{}", output.bibtex);
//!     Ok(())
//! }
//! ```
//!
//! Already have the text? [`convert_text`] skips pdfium entirely:
//!
//! ```rust
//! use paper2md::{convert_text, ContainerMetadata, ConversionConfig};
//!
//! let text = "Attention Is All You Need\nAlice Smith, Bob Jones\n\nAbstract\nWe propose a model.";
//! let out = convert_text(text, &ContainerMetadata::default(), &ConversionConfig::default());
//! assert_eq!(out.metadata.authors, vec!["Alice Smith", "Bob Jones"]);
//! assert!(out.markdown.contains("## Abstract"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paper2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! paper2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod bibtex;
pub mod config;
pub mod convert;
pub mod error;
pub mod filename;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{convert_batch, BatchReport};
pub use bibtex::{generate_bibtex, BibtexEntry, EntryType};
pub use config::{ClassifierConfig, ConversionConfig, ConversionConfigBuilder, PageSelection};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_text, convert_to_files, inspect};
pub use error::{DocumentError, Paper2MdError};
pub use filename::sanitize_filename;
pub use metadata::{MetadataExtractor, PaperMetadata};
pub use output::{ContainerMetadata, ConversionOutput, ConversionStats, WrittenDocument};
pub use pipeline::classify::{classify_document, Category, DocumentState, Fragment, LineClassifier};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
