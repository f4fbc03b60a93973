//! Top-level conversion entry points.
//!
//! ## Sync core, async shell
//!
//! [`convert_document`] runs the whole pipeline over any [`PageSource`] and
//! is plain synchronous code: extraction, classification, grouping and
//! rendering all depend on ordered, cumulative context, so there is nothing
//! to parallelise inside one document. The async [`convert`] validates the
//! input, then moves the pdfium work onto tokio's blocking pool with
//! `spawn_blocking`, since pdfium is CPU-bound and not async-safe.
//!
//! Every conversion owns its own [`ConversionStats`]; no state is shared
//! between documents, so independent conversions may run concurrently.

use crate::config::ConversionConfig;
use crate::error::Pdf2MdError;
use crate::model::TextBlock;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::{classify, extract, input, layout, postprocess, render};
use crate::progress::{ConversionProgressCallback, NoopProgressCallback};
use crate::source::pdfium::with_pdfium_document;
use crate::source::PageSource;
use crate::title::{self, TITLE_PAGES};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Directory created next to the input when no output location is given.
pub const DEFAULT_OUTPUT_DIR: &str = "markdown_output";

/// Run the structure-reconstruction pipeline over an open page source.
///
/// `path` is only used in error messages and logs.
///
/// # Errors
/// - [`Pdf2MdError::EmptyDocument`] when the source has no pages
/// - [`Pdf2MdError::PageOutOfRange`] when the page selection matches nothing
/// - [`Pdf2MdError::NoText`] when no page yields a text block
///
/// Pages that fail extraction are skipped and reported in
/// [`ConversionOutput::diagnostics`] and `stats.errors`.
pub fn convert_document<S: PageSource + ?Sized>(
    source: &mut S,
    path: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let start = Instant::now();

    // ── Step 1: Page count and selection ─────────────────────────────────
    let total_pages = source.page_count();
    if total_pages == 0 {
        return Err(Pdf2MdError::EmptyDocument {
            path: path.to_path_buf(),
        });
    }
    let metadata = source.metadata();

    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(Pdf2MdError::PageOutOfRange {
            page: config.pages.first_requested(),
            total: total_pages,
        });
    }
    debug!("Selected {} of {} pages", page_indices.len(), total_pages);

    // ── Step 2: Extract ──────────────────────────────────────────────────
    let noop = NoopProgressCallback;
    let progress: &dyn ConversionProgressCallback =
        config.progress_callback.as_deref().unwrap_or(&noop);
    let extraction =
        extract::extract_pages(source, &page_indices, config.default_font_size, progress);

    // ── Step 3: Classify per page ────────────────────────────────────────
    let blocks: Vec<TextBlock> = extraction
        .pages
        .into_iter()
        .flat_map(|page| classify::classify_page(page.blocks, config))
        .collect();

    if blocks.is_empty() {
        return Err(Pdf2MdError::NoText {
            path: path.to_path_buf(),
            failed_pages: extraction.diagnostics.len(),
        });
    }

    // ── Step 4: Group, render, clean up ──────────────────────────────────
    let groups = layout::group(&blocks, config.gap_threshold);
    debug!("{} blocks in {} layout groups", blocks.len(), groups.len());

    let rendered = render::render(&groups, config);
    let markdown = postprocess::postprocess(&rendered.markdown);

    // ── Step 5: Title ────────────────────────────────────────────────────
    let raw_title = title::extract_title(metadata.title.as_deref(), &blocks, || {
        (0..total_pages.min(TITLE_PAGES))
            .filter_map(|i| match source.page_text(i) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Title detection skipped page {}: {}", i + 1, e);
                    None
                }
            })
            .collect()
    });
    let title = raw_title.map(|t| title::sanitize_title(&t, config.max_title_length));

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = ConversionStats {
        pages: total_pages,
        selected_pages: page_indices.len(),
        blocks: blocks.len(),
        restored_texts: rendered.restored_texts,
        errors: extraction.diagnostics.len(),
        output_size: markdown.chars().count(),
        output_lines: markdown.lines().count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Converted '{}': {} pages, {} blocks, {} restored, {} errors, {}ms",
        path.display(),
        stats.pages,
        stats.blocks,
        stats.restored_texts,
        stats.errors,
        stats.duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        stats,
        metadata,
        title,
        diagnostics: extraction.diagnostics,
        output_path: None,
    })
}

/// Convert a PDF file to Markdown.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Fails before any extraction with [`Pdf2MdError::FileNotFound`] or
/// [`Pdf2MdError::InvalidFormat`]; otherwise see [`convert_document`].
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let path = input::validate_input(input_path.as_ref())?;
    info!("Starting conversion: {}", path.display());

    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        with_pdfium_document(&path, config.password.as_deref(), |doc| {
            convert_document(doc, &path, &config)
        })
    })
    .await
    .map_err(|e| Pdf2MdError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, config))
}

/// Convert a PDF and write the Markdown to a file.
///
/// With `output_path = None` the target is derived by [`resolve_output_path`]
/// from the document title. Uses atomic write (temp file + rename) to prevent
/// partial files. The written path is returned in
/// [`ConversionOutput::output_path`].
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let input_path = input_path.as_ref();
    let mut output = convert(input_path, config).await?;

    let target = resolve_output_path(input_path, output_path, output.title.as_deref(), config);
    write_markdown(&target, &output.markdown).await?;
    info!(
        "Saved Markdown: {} ({} chars, {} lines)",
        target.display(),
        output.stats.output_size,
        output.stats.output_lines
    );

    output.output_path = Some(target);
    Ok(output)
}

/// Where [`convert_to_file`] writes when given `explicit`.
///
/// Without an explicit target: `<dir>/<stem>.md`, where `dir` is
/// `config.output_dir` or `<input parent>/markdown_output`, and `stem` is the
/// sanitised title, falling back to the sanitised input file stem.
pub fn resolve_output_path(
    input_path: &Path,
    explicit: Option<&Path>,
    title: Option<&str>,
    config: &ConversionConfig,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let dir = config.output_dir.clone().unwrap_or_else(|| {
        input_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_OUTPUT_DIR)
    });

    let stem = match title {
        Some(t) => title::sanitize_title(t, config.max_title_length),
        None => {
            let file_stem = input_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            title::sanitize_title(&file_stem, config.max_title_length)
        }
    };

    dir.join(format!("{}.md", stem))
}

/// Atomically write `markdown` to `path`, creating parent directories.
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<(), Pdf2MdError> {
    let write_err = |e: std::io::Error| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Extract PDF metadata without converting content.
pub async fn inspect(input_path: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2MdError> {
    let path = input::validate_input(input_path.as_ref())?;
    tokio::task::spawn_blocking(move || with_pdfium_document(&path, None, |doc| Ok(doc.metadata())))
        .await
        .map_err(|e| Pdf2MdError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Convert PDF bytes in memory to Markdown.
///
/// pdfium needs a file-system path, so `bytes` are written to a managed
/// [`tempfile`] with a `.pdf` suffix that is removed on return or panic.
///
/// # Example
/// ```rust,no_run
/// use pdf2md_structure::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("document.pdf")?;
/// let output = convert_from_bytes(&bytes, &ConversionConfig::default()).await?;
/// println!("{}", output.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2MdError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2MdError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| Pdf2MdError::Internal(format!("tempfile flush: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(tmp.path(), config).await
}
