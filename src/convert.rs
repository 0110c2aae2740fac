//! Document-level conversion entry points.
//!
//! [`convert_text`] is the synchronous core: it takes already-extracted
//! text plus the container properties and runs the classifier, metadata
//! merge, Markdown assembly and BibTeX generation. Everything else here is
//! plumbing around it: resolving inputs, running pdfium, writing files.

use crate::bibtex::generate_bibtex;
use crate::config::ConversionConfig;
use crate::error::Paper2MdError;
use crate::filename::output_stem;
use crate::metadata::{MetadataExtractor, PaperMetadata};
use crate::output::{ContainerMetadata, ConversionOutput, ConversionStats, WrittenDocument};
use crate::pipeline::classify::classify_document;
use crate::pipeline::extract::{self, ExtractedDocument};
use crate::pipeline::input::{self, InputKind};
use crate::pipeline::postprocess;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF, a pre-extracted `.txt` file, or a URL to Markdown and BibTeX.
///
/// # Errors
/// Returns `Err(Paper2MdError)` when the document cannot be read at all:
/// missing file, not a PDF, wrong password, pdfium unavailable, or a page
/// selection that matches nothing.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Paper2MdError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = match resolved.kind() {
        InputKind::Pdf => {
            extract::extract_document(resolved.path(), &config.pages, config.password.as_deref())
                .await?
        }
        InputKind::Text => read_text_input(resolved.path()).await?,
    };
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} pages ({} empty) in {}ms",
        extracted.extracted_pages, extracted.empty_pages, extract_duration_ms
    );

    // ── Step 3: Classify and assemble ────────────────────────────────────
    let mut output = convert_text(&extracted.text, &extracted.container, config);
    output.stats.extracted_pages = extracted.extracted_pages;
    output.stats.empty_pages = extracted.empty_pages;
    output.stats.extract_duration_ms = extract_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} lines → {} fragments, {}ms total",
        output.stats.line_count, output.stats.fragment_count, output.stats.total_duration_ms
    );

    Ok(output)
}

/// Classify extracted text and build the Markdown and BibTeX outputs.
///
/// Container properties are recorded before the scan, so in-text values
/// only fill fields the container left empty. Never fails: every line has
/// some category.
pub fn convert_text(
    text: &str,
    container: &ContainerMetadata,
    config: &ConversionConfig,
) -> ConversionOutput {
    let start = Instant::now();
    let classifier = &config.classifier;

    let normalised = postprocess::normalise_extracted_text(text);
    let extractor = MetadataExtractor::with_container(container, classifier.abstract_max_chars);
    let doc = classify_document(&normalised, extractor, classifier);

    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    for category in &doc.categories {
        *categories.entry(category.as_str().to_string()).or_default() += 1;
    }
    debug!("Line categories: {:?}", categories);

    let markdown = assemble_document(&doc.markdown(), &doc.metadata, config);
    let bibtex = generate_bibtex(&doc.metadata);
    let classify_duration_ms = start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        total_pages: container.page_count,
        extracted_pages: 0,
        empty_pages: 0,
        line_count: doc.categories.len(),
        fragment_count: doc.fragments.len(),
        markdown_bytes: markdown.len(),
        categories,
        extract_duration_ms: 0,
        classify_duration_ms,
        total_duration_ms: classify_duration_ms,
    };

    ConversionOutput {
        markdown,
        bibtex,
        metadata: doc.metadata,
        container: container.clone(),
        stats,
    }
}

/// Convert one input and write `<stem>.md` (and `<stem>.bib`) into `output_dir`.
///
/// `<stem>` is the sanitised paper title, or the input's base name when no
/// title was found. Files are written atomically (temp file + rename) and
/// `output_dir` is created if missing.
pub async fn convert_to_files(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<WrittenDocument, Paper2MdError> {
    let input_str = input_str.as_ref();
    let output = convert(input_str, config).await?;
    let stem = output_stem(output.metadata.title.as_deref(), input_str);
    write_outputs(input_str, output, output_dir.as_ref(), &stem, config).await
}

/// Write a converted document as `<stem>.md` (and `<stem>.bib`).
pub(crate) async fn write_outputs(
    input_str: &str,
    output: ConversionOutput,
    output_dir: &Path,
    stem: &str,
    config: &ConversionConfig,
) -> Result<WrittenDocument, Paper2MdError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Paper2MdError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let markdown_path = output_dir.join(format!("{stem}.md"));
    write_atomic(&markdown_path, &output.markdown).await?;

    let bibtex_path = if config.write_bibtex {
        let path = output_dir.join(format!("{stem}.bib"));
        write_atomic(&path, &output.bibtex).await?;
        Some(path)
    } else {
        None
    };

    info!("Wrote {}", markdown_path.display());

    Ok(WrittenDocument {
        input: input_str.to_string(),
        markdown_path,
        bibtex_path,
        metadata: output.metadata,
        stats: output.stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Paper2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Paper2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Read a document's container properties without classifying its text.
///
/// Pre-extracted text inputs have no container, so they yield the default.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ContainerMetadata, Paper2MdError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    match resolved.kind() {
        InputKind::Pdf => extract::extract_metadata(resolved.path(), config.password.as_deref()).await,
        InputKind::Text => Ok(ContainerMetadata::default()),
    }
}

/// Convert PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed when
/// this returns.
///
/// ```rust,no_run
/// use paper2md::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("paper.pdf")?;
/// let output = convert_from_bytes(&bytes, &ConversionConfig::default()).await?;
/// println!("{}", output.bibtex);
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Paper2MdError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Paper2MdError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Paper2MdError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    convert(&path, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn read_text_input(path: &Path) -> Result<ExtractedDocument, Paper2MdError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Paper2MdError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    let (extracted_pages, empty_pages) = if text.trim().is_empty() { (0, 1) } else { (1, 0) };
    Ok(ExtractedDocument {
        text,
        container: ContainerMetadata::default(),
        extracted_pages,
        empty_pages,
    })
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), Paper2MdError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| Paper2MdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Paper2MdError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Front matter (if enabled) + classified body, then the optional tidy pass.
fn assemble_document(body: &str, metadata: &PaperMetadata, config: &ConversionConfig) -> String {
    let mut markdown = String::with_capacity(body.len() + 256);
    if config.include_front_matter {
        markdown.push_str(&format_yaml_front_matter(metadata));
    }
    markdown.push_str(body);

    if config.tidy_output {
        postprocess::tidy_markdown(&markdown)
    } else {
        markdown
    }
}

/// Format paper metadata as YAML front matter.
fn format_yaml_front_matter(meta: &PaperMetadata) -> String {
    let mut yaml = String::from("---\n");

    if let Some(ref t) = meta.title {
        yaml.push_str(&format!("title: \"{}\"\n", yaml_escape(t)));
    }
    if !meta.authors.is_empty() {
        yaml.push_str("authors:\n");
        for a in &meta.authors {
            yaml.push_str(&format!("  - \"{}\"\n", yaml_escape(a)));
        }
    }
    if let Some(ref y) = meta.year {
        yaml.push_str(&format!("year: {}\n", y));
    }
    if let Some(ref v) = meta.venue {
        yaml.push_str(&format!("venue: \"{}\"\n", yaml_escape(v)));
    }

    yaml.push_str("---\n\n");
    yaml
}

fn yaml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
