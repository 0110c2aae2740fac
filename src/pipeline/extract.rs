//! Text extraction: per-page text layer and container properties via pdfium.
//!
//! pdfium wraps a C++ library with thread-local state, so every call here
//! runs inside `tokio::task::spawn_blocking` and binds its own `Pdfium`
//! instance on that thread.
//!
//! The library is looked up in `PDFIUM_LIB_PATH` (a directory holding the
//! platform library, or the library file itself) and then on the system
//! loader path.

use crate::config::PageSelection;
use crate::error::Paper2MdError;
use crate::output::ContainerMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Separator between the text of consecutive non-empty pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Provider output for one document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    /// Non-empty page texts joined with [`PAGE_SEPARATOR`].
    pub text: String,
    pub container: ContainerMetadata,
    /// Selected pages that produced text.
    pub extracted_pages: usize,
    /// Selected pages whose text layer was blank.
    pub empty_pages: usize,
}

/// Bind to pdfium, trying `PDFIUM_LIB_PATH` before the system library.
pub fn bind_pdfium() -> Result<Pdfium, Paper2MdError> {
    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let p = PathBuf::from(&env_path);
        let lib = if p.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&p)
        } else {
            p
        };
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => return Ok(Pdfium::new(bindings)),
            Err(e) => warn!(
                "PDFIUM_LIB_PATH '{}' could not be bound ({}); trying system library",
                lib.display(),
                e
            ),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| Paper2MdError::PdfiumBindingFailed(e.to_string()))
}

/// Extract the selected pages' text and the container metadata of a PDF.
pub async fn extract_document(
    pdf_path: &Path,
    pages: &PageSelection,
    password: Option<&str>,
) -> Result<ExtractedDocument, Paper2MdError> {
    let path = pdf_path.to_path_buf();
    let selection = pages.clone();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_document_blocking(&path, &selection, pwd.as_deref()))
        .await
        .map_err(|e| Paper2MdError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Read only the container metadata, without touching page text.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<ContainerMetadata, Paper2MdError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        Ok(read_container(&document))
    })
    .await
    .map_err(|e| Paper2MdError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_document_blocking(
    pdf_path: &Path,
    selection: &PageSelection,
    password: Option<&str>,
) -> Result<ExtractedDocument, Paper2MdError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let container = read_container(&document);
    let total_pages = container.page_count;
    info!("PDF loaded: {} pages", total_pages);

    let indices = selection.to_indices(total_pages);
    if indices.is_empty() && total_pages > 0 {
        return Err(Paper2MdError::PageOutOfRange {
            page: first_requested_page(selection),
            total: total_pages,
        });
    }

    let pages = document.pages();
    let mut texts = Vec::with_capacity(indices.len());
    for idx in indices {
        let page = pages
            .get(idx as PdfPageIndex)
            .map_err(|e| Paper2MdError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;
        let text = page
            .text()
            .map_err(|e| Paper2MdError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars of text", idx + 1, text.len());
        texts.push((idx, text));
    }

    let (text, extracted_pages, empty_pages) = join_pages(&texts);
    Ok(ExtractedDocument {
        text,
        container,
        extracted_pages,
        empty_pages,
    })
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Paper2MdError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Paper2MdError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Paper2MdError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Paper2MdError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn read_container(document: &PdfDocument<'_>) -> ContainerMetadata {
    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    ContainerMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

/// Join page texts in order, skipping pages that are blank.
///
/// Returns the joined text with the counts of non-empty and empty pages.
pub fn join_pages(pages: &[(usize, String)]) -> (String, usize, usize) {
    let mut kept = Vec::with_capacity(pages.len());
    let mut empty = 0;
    for (idx, text) in pages {
        if text.trim().is_empty() {
            warn!("Page {} has no text layer; skipping", idx + 1);
            empty += 1;
        } else {
            kept.push(text.as_str());
        }
    }
    let extracted = kept.len();
    (kept.join(PAGE_SEPARATOR), extracted, empty)
}

fn first_requested_page(selection: &PageSelection) -> usize {
    match selection {
        PageSelection::All => 1,
        PageSelection::Single(p) => *p,
        PageSelection::Range(start, _) => *start,
        PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(1),
    }
}
