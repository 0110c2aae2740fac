//! Input resolution: turn a user-supplied path or URL into a local file.
//!
//! Two kinds of input are accepted. PDFs go through pdfium; `.txt` files are
//! treated as text that some other tool already extracted, one line of the
//! paper per line of the file.
//!
//! URLs are downloaded into a `TempDir` that lives as long as the
//! [`ResolvedInput`], so the file is cleaned up when conversion finishes.
//! PDF inputs must start with the `%PDF` magic bytes.

use crate::error::Paper2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// How the resolved file should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A PDF document, read through pdfium.
    Pdf,
    /// Pre-extracted plain text, read as-is.
    Text,
}

impl InputKind {
    /// `.txt` (any case) is text; everything else is expected to be a PDF.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => InputKind::Text,
            _ => InputKind::Pdf,
        }
    }
}

/// The resolved input: a local path or a downloaded temp file.
pub enum ResolvedInput {
    Local { path: PathBuf, kind: InputKind },
    /// The `TempDir` is held so the download outlives conversion.
    Downloaded {
        path: PathBuf,
        kind: InputKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } | ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a readable local file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Paper2MdError> {
    if input.trim().is_empty() {
        return Err(Paper2MdError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, Paper2MdError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Paper2MdError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Paper2MdError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    let kind = InputKind::from_path(&path);
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == InputKind::Pdf {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() {
                    check_pdf_magic(&path, &magic)?;
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Paper2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Paper2MdError::FileNotFound { path });
        }
    }

    debug!("Resolved local {:?} input: {}", kind, path.display());
    Ok(ResolvedInput::Local { path, kind })
}

fn check_pdf_magic(path: &Path, bytes: &[u8]) -> Result<(), Paper2MdError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(Paper2MdError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Paper2MdError> {
    info!("Downloading from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Paper2MdError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Paper2MdError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Paper2MdError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Paper2MdError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|e| Paper2MdError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);
    let kind = InputKind::from_path(&file_path);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Paper2MdError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Paper2MdError::Internal(format!("Failed to write temp file: {}", e)))?;

    if kind == InputKind::Pdf {
        check_pdf_magic(&file_path, &bytes)?;
    }

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment when it looks like a file name, else `downloaded.pdf`.
///
/// arXiv-style `/pdf/1706.03762` segments contain a dot but no known
/// extension; they get `.pdf` appended so the kind detection stays right.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    let lower = last.to_ascii_lowercase();
                    if lower.ends_with(".pdf") || lower.ends_with(".txt") {
                        return last.to_string();
                    }
                    return format!("{last}.pdf");
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(InputKind::from_path(Path::new("paper.pdf")), InputKind::Pdf);
        assert_eq!(InputKind::from_path(Path::new("paper.TXT")), InputKind::Text);
        assert_eq!(InputKind::from_path(Path::new("paper")), InputKind::Pdf);
    }

    #[test]
    fn filenames_from_urls() {
        assert_eq!(filename_from_url("https://example.com/a/paper.pdf"), "paper.pdf");
        assert_eq!(filename_from_url("https://arxiv.org/pdf/1706.03762"), "1706.03762.pdf");
        assert_eq!(filename_from_url("https://example.com/notes.txt"), "notes.txt");
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_local("/definitely/not/here.pdf").err().unwrap();
        assert!(matches!(err, Paper2MdError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_bytes_are_rejected() {
        let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        f.write_all(b"PK\x03\x04zip").unwrap();
        let err = resolve_local(f.path().to_str().unwrap()).err().unwrap();
        assert!(matches!(err, Paper2MdError::NotAPdf { .. }), "got {err:?}");
    }

    #[test]
    fn text_inputs_skip_magic_check() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        f.write_all(b"Some Extracted Paper Title\n").unwrap();
        let resolved = resolve_local(f.path().to_str().unwrap()).unwrap();
        assert_eq!(resolved.kind(), InputKind::Text);
        assert_eq!(resolved.path(), f.path());
    }

    #[test]
    fn blank_input_is_invalid() {
        let err = tokio_test::block_on(resolve_input("  ", 5)).err().unwrap();
        assert!(matches!(err, Paper2MdError::InvalidInput { .. }));
    }
}
