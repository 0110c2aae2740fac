//! Multi-document conversion with per-document failure isolation.
//!
//! Each input is converted and written like [`crate::convert_to_files`]; up to
//! `config.concurrency` documents are in flight at once. A document that
//! fails is recorded in [`BatchReport::failed`] and never stops the others.
//!
//! Output stems are unique within a batch: when two papers sanitise to the
//! same name, the later writer gets `<stem>_2`, `<stem>_3`, and so on.

use crate::config::ConversionConfig;
use crate::convert::{convert, write_outputs};
use crate::error::{DocumentError, Paper2MdError};
use crate::filename::output_stem;
use crate::output::WrittenDocument;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<WrittenDocument>,
    pub failed: Vec<DocumentError>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when there was at least one input and none converted.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Convert every input into `output_dir`.
pub async fn convert_batch<S: AsRef<str>>(
    inputs: &[S],
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> BatchReport {
    let output_dir = output_dir.as_ref();
    let total = inputs.len();
    info!("Starting batch: {} documents → {}", total, output_dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let claimed = Mutex::new(HashSet::new());
    let claimed = &claimed;

    let mut results: Vec<(usize, Result<WrittenDocument, DocumentError>)> =
        stream::iter(inputs.iter().enumerate().map(|(idx, input)| {
            let input = input.as_ref().to_string();
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_start(&input);
                }
                let result = convert_document(&input, output_dir, config, claimed).await;
                let result = match result {
                    Ok(written) => {
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_document_complete(&input, written.stats.markdown_bytes);
                        }
                        Ok(written)
                    }
                    Err(e) => {
                        warn!("Failed to convert {}: {}", input, e);
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_document_error(&input, &e.to_string());
                        }
                        Err(DocumentError::from_fatal(&input, &e))
                    }
                };
                (idx, result)
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);

    let mut report = BatchReport::default();
    for (_, result) in results {
        match result {
            Ok(written) => report.succeeded.push(written),
            Err(e) => report.failed.push(e),
        }
    }

    info!(
        "Batch complete: {}/{} documents converted",
        report.succeeded.len(),
        total
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, report.succeeded.len());
    }

    report
}

async fn convert_document(
    input: &str,
    output_dir: &Path,
    config: &ConversionConfig,
    claimed: &Mutex<HashSet<String>>,
) -> Result<WrittenDocument, Paper2MdError> {
    let output = convert(input, config).await?;
    let stem = claim_stem(claimed, output_stem(output.metadata.title.as_deref(), input));
    write_outputs(input, output, output_dir, &stem, config).await
}

/// Reserve `stem`, or the first free `<stem>_N` when it is taken.
fn claim_stem(claimed: &Mutex<HashSet<String>>, stem: String) -> String {
    let mut claimed = claimed.lock().unwrap_or_else(|e| e.into_inner());
    if claimed.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}");
        if claimed.insert(candidate.clone()) {
            warn!("Output name {} already used in this batch, writing {}", stem, candidate);
            return candidate;
        }
        n += 1;
    }
}
