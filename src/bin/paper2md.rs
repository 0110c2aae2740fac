//! CLI binary for paper2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, expands directory inputs, and reports results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paper2md::{
    convert_batch, inspect, ConversionConfig, ConversionProgressCallback, PageSelection,
    ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar for the whole batch plus a log line per finished document.
/// Documents may finish out of order when `--concurrency > 1`.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<String, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} papers  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, input: &str) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(input)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.reset_eta();
    }

    fn on_document_start(&self, input: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(input.to_string(), Instant::now());
        self.bar.set_message(short_name(input));
    }

    fn on_document_complete(&self, input: &str, markdown_len: usize) {
        let secs = self.elapsed_secs(input);
        self.bar.println(format!(
            "  {} {:<40}  {}  {}",
            green("✓"),
            short_name(input),
            dim(&format!("{markdown_len:>7} bytes")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, input: &str, error: &str) {
        let secs = self.elapsed_secs(input);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let first_line = error.lines().next().unwrap_or(error);
        let msg: String = if first_line.chars().count() > 80 {
            let head: String = first_line.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:<40}  {}  {}",
            red("✗"),
            short_name(input),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let failed = total_documents.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} papers converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} papers converted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

fn short_name(input: &str) -> String {
    input.rsplit('/').next().unwrap_or(input).to_string()
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one paper into ./output/<Title>.md and ./output/<Title>.bib
  paper2md attention.pdf

  # Convert every PDF and .txt file in a directory, 8 at a time
  paper2md papers/ --output-dir converted --concurrency 8

  # Convert text that another tool already extracted
  paper2md extracted/attention.txt

  # Convert from URL
  paper2md https://arxiv.org/pdf/1706.03762

  # First pages only, with YAML front matter and no .bib file
  paper2md --pages 1-3 --front-matter --no-bib paper.pdf

  # Inspect container metadata without converting
  paper2md --inspect-only paper.pdf

  # Machine-readable batch report
  paper2md --json papers/ > report.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Directory containing libpdfium (or the library file);
                          falls back to the system library search path
  RUST_LOG                Override log filtering (e.g. paper2md=debug)
"#;

/// Convert academic-paper PDFs to Markdown and BibTeX.
#[derive(Parser, Debug)]
#[command(
    name = "paper2md",
    version,
    about = "Convert academic-paper PDFs to Markdown and BibTeX",
    long_about = "Convert academic-paper PDFs (local files, directories, or URLs) to structured \
Markdown plus a BibTeX entry. Text is extracted with pdfium and each line is classified \
heuristically as title, author, abstract, section, equation, table caption, bullet or paragraph.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or .txt files, directories containing them, or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory receiving the .md and .bib files.
    #[arg(short, long, env = "PAPER2MD_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Print container metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report instead of the human summary.
    #[arg(long, env = "PAPER2MD_JSON")]
    json: bool,

    /// Prepend YAML front matter with the extracted paper metadata.
    #[arg(long, env = "PAPER2MD_FRONT_MATTER")]
    front_matter: bool,

    /// Do not write .bib files.
    #[arg(long, env = "PAPER2MD_NO_BIB")]
    no_bib: bool,

    /// Keep the raw fragment layout (no blank-line collapsing).
    #[arg(long, env = "PAPER2MD_NO_TIDY")]
    no_tidy: bool,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PAPER2MD_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PAPER2MD_PASSWORD")]
    password: Option<String>,

    /// Lines from the top in which a title may be detected.
    #[arg(long, env = "PAPER2MD_TITLE_WINDOW", default_value_t = 15)]
    title_window: usize,

    /// Lines from the top in which author/affiliation lines may be detected.
    #[arg(long, env = "PAPER2MD_METADATA_WINDOW", default_value_t = 40)]
    metadata_window: usize,

    /// Number of documents converted at once.
    #[arg(short, long, env = "PAPER2MD_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PAPER2MD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PAPER2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPER2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPER2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters; library INFO
    // logs would tear through it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let inputs = expand_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        anyhow::bail!("No .pdf or .txt inputs found");
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        return run_inspect(&cli, &inputs, &config).await;
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_batch(&inputs[..], &cli.output_dir, &config).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        for doc in &report.succeeded {
            eprintln!(
                "  {}  {} lines  {}ms",
                bold(&doc.markdown_path.display().to_string()),
                dim(&doc.stats.line_count.to_string()),
                doc.stats.total_duration_ms,
            );
        }
        if !show_progress {
            eprintln!(
                "Converted {}/{} papers into {}",
                report.succeeded.len(),
                report.total(),
                cli.output_dir.display()
            );
            for failure in &report.failed {
                eprintln!("  {} {}", red("✗"), failure);
            }
        }
    }

    if report.all_failed() {
        anyhow::bail!("All {} documents failed to convert", report.total());
    }

    Ok(())
}

async fn run_inspect(cli: &Cli, inputs: &[String], config: &ConversionConfig) -> Result<()> {
    let mut failures = 0;
    for input in inputs {
        let meta = match inspect(input, config).await {
            Ok(meta) => meta,
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", red("✗"), input, e);
                continue;
            }
        };

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:          {}", input);
            if let Some(ref t) = meta.title {
                println!("Title:         {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:        {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:       {}", s);
            }
            if let Some(ref d) = meta.creation_date {
                println!("Created:       {}", d);
            }
            println!("Pages:         {}", meta.page_count);
            if !meta.pdf_version.is_empty() {
                println!("PDF Version:   {}", meta.pdf_version);
            }
            if let Some(ref p) = meta.producer {
                println!("Producer:      {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:       {}", c);
            }
            println!();
        }
    }

    if failures == inputs.len() {
        anyhow::bail!("Could not inspect any of the {} inputs", inputs.len());
    }
    Ok(())
}

/// Replace directory arguments with the `.pdf` and `.txt` files inside them
/// (non-recursive, sorted). Files and URLs pass through unchanged.
fn expand_inputs(args: &[String]) -> Result<Vec<String>> {
    let mut inputs = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if !path.is_dir() {
            inputs.push(arg.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {:?}", path))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_input_extension(p))
            .collect();
        found.sort();
        inputs.extend(found.into_iter().map(|p| p.to_string_lossy().into_owned()));
    }
    Ok(inputs)
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf") || e.eq_ignore_ascii_case("txt"))
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ConversionConfig::builder()
        .title_window(cli.title_window)
        .metadata_window(cli.metadata_window)
        .pages(pages)
        .include_front_matter(cli.front_matter)
        .tidy_output(!cli.no_tidy)
        .write_bibtex(!cli.no_bib)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
