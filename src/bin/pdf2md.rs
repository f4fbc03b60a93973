//! CLI binary for pdf2md-structure.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2md_structure::batch::BatchStatus;
use pdf2md_structure::{
    convert, convert_batch, convert_to_file, inspect, BatchOptions, ConversionConfig,
    ConversionProgressCallback, PageSelection, PageSeparator, ProgressCallback,
    RestorationPolicy,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

/// Terminal progress callback: one bar per document, one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.reset();
        self.bar.set_length(total_pages as u64);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, block_count: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{block_count:>4} blocks")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_pages.saturating_sub(success_count);
        if failed > 0 {
            eprintln!(
                "{} {}/{} pages extracted  ({} skipped)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (stdout)
  pdf2md document.pdf

  # Convert to file
  pdf2md document.pdf -o output.md

  # Name the output after the document title, in a directory
  pdf2md document.pdf --output-dir notes/

  # Several files: written to <first input dir>/markdown_output/ with a
  # conversion_stats.json summary
  pdf2md a.pdf b.pdf c.pdf

  # Invoices and statements: keep digits as they are
  pdf2md --no-restore invoice.pdf

  # Specific pages, horizontal rules between pages
  pdf2md --pages 3-15 --separator hr paper.pdf -o paper.md

  # Inspect PDF metadata
  pdf2md --inspect-only document.pdf

  # JSON output with stats and diagnostics
  pdf2md --json document.pdf > output.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Log filter (overrides -v / -q)
  PDF2MD_*                Every flag can also be set via its PDF2MD_ variable
"#;

/// Rebuild PDF structure as Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Rebuild headings, lists, code and paragraphs from PDF text as Markdown",
    long_about = "Convert PDF documents to structured Markdown by classifying their text \
blocks from font size, weight, position and text patterns. Works on the PDF's own text \
layer; scanned documents need OCR first.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file(s) to convert. More than one runs a batch.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write Markdown to this file instead of stdout (single input only).
    #[arg(short, long, env = "PDF2MD_OUTPUT", conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Write title-named Markdown files into this directory.
    #[arg(long, env = "PDF2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2MD_PAGES", default_value = "all")]
    pages: PageSelection,

    /// Page separator: none, hr, comment, or custom string.
    #[arg(long, env = "PDF2MD_SEPARATOR", default_value = "comment")]
    separator: PageSeparator,

    /// Vertical gap that starts a new layout group.
    #[arg(long, env = "PDF2MD_GAP", default_value_t = 25.0)]
    gap: f32,

    /// Font size relative to the page mean that makes a heading.
    #[arg(long, env = "PDF2MD_HEADING_RATIO", default_value_t = 1.3)]
    heading_ratio: f32,

    /// Blocks borrowed from neighbouring groups for digit repair.
    #[arg(long, env = "PDF2MD_CONTEXT_WINDOW", default_value_t = 3)]
    context_window: usize,

    /// Do not repair digits that look like letters (0→O, 1→I, 5→S, 8→B).
    #[arg(long, env = "PDF2MD_NO_RESTORE")]
    no_restore: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2MD_PASSWORD")]
    password: Option<String>,

    /// Batch: stop at the first failing document.
    #[arg(long, env = "PDF2MD_STOP_ON_ERROR")]
    stop_on_error: bool,

    /// Output structured JSON (ConversionOutput / BatchReport) instead of Markdown.
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let is_batch = cli.inputs.len() > 1;
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !is_batch;
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let meta = inspect(input)
                .await
                .with_context(|| format!("Failed to inspect {}", input.display()))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", input.display());
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                if let Some(ref s) = meta.subject {
                    println!("Subject:      {}", s);
                }
                println!("Pages:        {}", meta.page_count);
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                if let Some(ref c) = meta.creator {
                    println!("Creator:      {}", c);
                }
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Batch mode ───────────────────────────────────────────────────────
    if is_batch {
        if cli.output.is_some() {
            anyhow::bail!("--output takes a single input; use --output-dir for several files");
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{} stopping after the current document…", cyan("⚠"));
                flag.store(true, Ordering::SeqCst);
            }
        });

        let options = BatchOptions {
            continue_on_error: !cli.stop_on_error,
            cancel: Some(cancel),
            output_dir: cli.output_dir.clone(),
        };
        let report = convert_batch(&cli.inputs, &config, &options)
            .await
            .context("Batch conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet {
            for entry in &report.results {
                match entry.status {
                    BatchStatus::Success => eprintln!(
                        "  {} {}  →  {}",
                        green("✓"),
                        entry.input.display(),
                        entry
                            .output
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default()
                    ),
                    BatchStatus::Failed => eprintln!(
                        "  {} {}  {}",
                        red("✗"),
                        entry.input.display(),
                        red(entry.error.as_deref().unwrap_or("unknown error"))
                    ),
                }
            }
            eprintln!(
                "{}  {}/{} files  {}ms  →  {}",
                if report.failed == 0 { green("✔") } else { cyan("⚠") },
                report.success,
                report.total,
                report.duration_ms,
                bold(&report.output_dir.display().to_string()),
            );
        }

        if report.failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ── Single document ──────────────────────────────────────────────────
    let input = &cli.inputs[0];
    if cli.output.is_some() || cli.output_dir.is_some() {
        let output = convert_to_file(input, cli.output.as_deref(), &config)
            .await
            .context("Conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?
            );
        } else if !cli.quiet {
            let stats = &output.stats;
            eprintln!(
                "{}  {} pages  {} blocks  {}ms  →  {}",
                if stats.errors == 0 { green("✔") } else { cyan("⚠") },
                stats.selected_pages,
                stats.blocks,
                stats.duration_ms,
                bold(
                    &output
                        .output_path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                ),
            );
            eprintln!(
                "   {} words repaired  /  {} chars, {} lines",
                dim(&stats.restored_texts.to_string()),
                dim(&stats.output_size.to_string()),
                dim(&stats.output_lines.to_string()),
            );
        }
    } else {
        let output = convert(input, &config).await.context("Conversion failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.markdown.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !output.markdown.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            eprintln!(
                "Converted {} pages, {} blocks in {}ms",
                output.stats.selected_pages, output.stats.blocks, output.stats.duration_ms
            );
            if output.stats.errors > 0 {
                eprintln!("  {} pages failed", output.stats.errors);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .pages(cli.pages.clone())
        .page_separator(cli.separator.clone())
        .gap_threshold(cli.gap)
        .heading_size_ratio(cli.heading_ratio)
        .context_window(cli.context_window);

    if cli.no_restore {
        builder = builder.restoration(RestorationPolicy::Disabled);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
