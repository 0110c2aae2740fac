//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::batch::convert_batch`] works through its inputs.
//!
//! # Example
//!
//! ```rust
//! use paper2md::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, input: &str, markdown_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("#{done}: {input} ({markdown_len} bytes)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch driver as it processes each document.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the
/// per-document methods may be called from different tasks at once. All
/// methods default to no-ops so callers only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any document is opened.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is resolved and extracted.
    fn on_document_start(&self, input: &str) {
        let _ = input;
    }

    /// Called when a document's Markdown (and BibTeX) were written.
    ///
    /// `markdown_len` is the byte length of the produced Markdown.
    fn on_document_complete(&self, input: &str, markdown_len: usize) {
        let _ = (input, markdown_len);
    }

    /// Called when a document failed; the batch carries on.
    fn on_document_error(&self, input: &str, error: &str) {
        let _ = (input, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
