//! Error types for the paper2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Paper2MdError`] is **fatal for one document**: the document cannot be
//!   converted at all (bad input file, wrong password, pdfium missing).
//!   Returned as `Err(Paper2MdError)` from the `convert*` functions.
//!
//! * [`DocumentError`] is **non-fatal for a batch**: one document failed but
//!   the rest of the batch is fine. Stored inside
//!   [`crate::batch::BatchReport`] so one broken PDF never costs the caller
//!   the other ninety-nine.
//!
//! Line classification has no error type: every predicate is total, and a
//! line that matches nothing is simply a paragraph line.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the paper2md library.
#[derive(Debug, Error)]
pub enum Paper2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': not a PDF/text file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection does not match any page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium could not produce a text layer for a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read a pre-extracted text input.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file (Markdown or BibTeX).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install libpdfium so the system loader can find it.\n\
  • Set PDFIUM_LIB_PATH=/dir/containing/libpdfium.\n\
  • Convert a pre-extracted .txt file instead of the PDF.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document in a batch.
///
/// Stored in [`crate::batch::BatchReport::failed`]. The batch continues with
/// the remaining documents.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// Extraction or classification failed.
    #[error("{input}: conversion failed: {detail}")]
    ConversionFailed { input: String, detail: String },

    /// The document converted but its output files could not be written.
    #[error("{input}: could not write output: {detail}")]
    WriteFailed { input: String, detail: String },
}

impl DocumentError {
    /// Classify a fatal per-document error for storage in a batch report.
    pub fn from_fatal(input: &str, err: &Paper2MdError) -> Self {
        match err {
            Paper2MdError::OutputWriteFailed { .. } => DocumentError::WriteFailed {
                input: input.to_string(),
                detail: err.to_string(),
            },
            _ => DocumentError::ConversionFailed {
                input: input.to_string(),
                detail: err.to_string(),
            },
        }
    }

    /// The input string the failure belongs to.
    pub fn input(&self) -> &str {
        match self {
            DocumentError::ConversionFailed { input, .. } | DocumentError::WriteFailed { input, .. } => {
                input
            }
        }
    }
}
