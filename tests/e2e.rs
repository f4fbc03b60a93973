//! End-to-end tests for pdf2md-structure.
//!
//! The first half drives the full pipeline through in-memory page sources and
//! always runs. The second half reads real PDFs from `./test_cases/` through
//! pdfium; those tests are gated behind the `E2E_ENABLED` environment
//! variable and skip themselves when a sample file is missing.
//!
//! Run the gated tests with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture

use pdf2md_structure::convert::{resolve_output_path, write_markdown};
use pdf2md_structure::source::memory::{MemoryDocument, MemoryPage};
use pdf2md_structure::{
    convert, convert_document, convert_to_file, inspect, ConversionConfig,
    ConversionProgressCallback, PageSelection, PageSeparator, Pdf2MdError, RestorationPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn run(doc: &mut MemoryDocument, config: &ConversionConfig) -> Result<String, Pdf2MdError> {
    convert_document(doc, Path::new("memory.pdf"), config).map(|o| o.markdown)
}

/// Assert the markdown passes basic quality checks.
fn assert_markdown_quality(md: &str, context: &str) {
    assert!(!md.trim().is_empty(), "[{context}] Markdown is empty");
    assert_eq!(md, md.trim(), "[{context}] Markdown must be trimmed");
    assert!(
        !md.contains("\n\n\n\n"),
        "[{context}] Output has more than 3 consecutive newlines"
    );
    for line in md.lines() {
        assert_eq!(
            line,
            line.trim_end(),
            "[{context}] Trailing whitespace on line {line:?}"
        );
    }
    let invisible = ['\u{200B}', '\u{FEFF}', '\u{00AD}'];
    for ch in invisible {
        assert!(
            !md.contains(ch),
            "[{context}] Output contains invisible char U+{:04X}",
            ch as u32
        );
    }
}

// ── In-memory pipeline ───────────────────────────────────────────────────────

#[test]
fn test_invoice_heading_and_paragraph() {
    let mut doc = MemoryDocument::new().with_page(
        MemoryPage::new()
            .block("INVOICE", 50.0, 24.0, true)
            .block("Total due: $100", 94.0, 11.0, false),
    );
    let out = convert_document(&mut doc, Path::new("invoice.pdf"), &ConversionConfig::default())
        .unwrap();

    assert_eq!(out.markdown, "# INVOICE\n\nTotal due: $100");
    assert_eq!(out.stats.pages, 1);
    assert_eq!(out.stats.blocks, 2);
    assert_eq!(out.stats.errors, 0);
    assert_eq!(out.stats.output_lines, 3);
    assert_eq!(out.title.as_deref(), Some("INVOICE"));
    assert_markdown_quality(&out.markdown, "invoice");
}

#[test]
fn test_page_marker_emitted_once_per_page_change() {
    let mut doc = MemoryDocument::new()
        .with_page(
            MemoryPage::new()
                .block("Alpha paragraph text.", 100.0, 11.0, false)
                .block("More alpha text here.", 300.0, 11.0, false),
        )
        .with_page(MemoryPage::new().block("Beta paragraph text.", 100.0, 11.0, false));
    let md = run(&mut doc, &ConversionConfig::default()).unwrap();

    assert_eq!(md.matches("<!-- Page 2 -->").count(), 1);
    assert!(!md.contains("<!-- Page 1 -->"));
    assert!(md.find("More alpha").unwrap() < md.find("<!-- Page 2 -->").unwrap());
    assert!(md.ends_with("Beta paragraph text."));
    assert_markdown_quality(&md, "two pages");
}

#[test]
fn test_separator_none_and_horizontal_rule() {
    let pages = || {
        MemoryDocument::new()
            .with_page(MemoryPage::new().block("First page.", 100.0, 11.0, false))
            .with_page(MemoryPage::new().block("Second page.", 100.0, 11.0, false))
    };

    let config = ConversionConfig::builder()
        .page_separator(PageSeparator::None)
        .build()
        .unwrap();
    assert_eq!(
        run(&mut pages(), &config).unwrap(),
        "First page.\n\nSecond page."
    );

    let config = ConversionConfig::builder()
        .page_separator(PageSeparator::HorizontalRule)
        .build()
        .unwrap();
    assert_eq!(
        run(&mut pages(), &config).unwrap(),
        "First page.\n\n\n---\n\nSecond page."
    );
}

#[test]
fn test_image_only_document_has_no_text() {
    let mut doc = MemoryDocument::new()
        .with_page(MemoryPage::new().image(50.0, 600.0))
        .with_page(MemoryPage::new().image(50.0, 600.0));
    match run(&mut doc, &ConversionConfig::default()) {
        Err(Pdf2MdError::NoText { failed_pages, .. }) => assert_eq!(failed_pages, 0),
        other => panic!("expected NoText, got {other:?}"),
    }
}

#[test]
fn test_all_pages_failing_counts_failures() {
    let mut doc = MemoryDocument::new()
        .with_page(MemoryPage::new().failing("bad xref"))
        .with_page(MemoryPage::new().failing("bad xref"));
    match run(&mut doc, &ConversionConfig::default()) {
        Err(Pdf2MdError::NoText { failed_pages, .. }) => assert_eq!(failed_pages, 2),
        other => panic!("expected NoText, got {other:?}"),
    }
}

#[test]
fn test_failing_page_is_skipped_and_reported() {
    let mut doc = MemoryDocument::new()
        .with_page(MemoryPage::new().block("Readable first page.", 100.0, 11.0, false))
        .with_page(MemoryPage::new().failing("corrupt content stream"))
        .with_page(MemoryPage::new().block("Readable third page.", 100.0, 11.0, false));
    let out =
        convert_document(&mut doc, Path::new("partial.pdf"), &ConversionConfig::default())
            .unwrap();

    assert_eq!(out.stats.errors, 1);
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].page(), 2);
    assert!(out.markdown.contains("Readable first page."));
    assert!(out.markdown.contains("<!-- Page 3 -->"));
    assert!(!out.markdown.contains("<!-- Page 2 -->"));
}

#[test]
fn test_page_selection_out_of_range() {
    let mut doc =
        MemoryDocument::new().with_page(MemoryPage::new().block("Only page.", 100.0, 11.0, false));
    let config = ConversionConfig::builder()
        .pages(PageSelection::Range(4, 6))
        .build()
        .unwrap();
    match run(&mut doc, &config) {
        Err(Pdf2MdError::PageOutOfRange { page, total }) => {
            assert_eq!(page, 4);
            assert_eq!(total, 1);
        }
        other => panic!("expected PageOutOfRange, got {other:?}"),
    }
}

#[test]
fn test_restoration_uses_neighbouring_group() {
    // The two blocks are far apart, so they land in separate layout groups.
    let doc = || {
        MemoryDocument::new().with_page(
            MemoryPage::new()
                .block("The company reported growth.", 50.0, 11.0, false)
                .block("C0MPANY results follow.", 200.0, 11.0, false),
        )
    };

    let out = convert_document(&mut doc(), Path::new("r.pdf"), &ConversionConfig::default())
        .unwrap();
    assert_eq!(
        out.markdown,
        "The company reported growth.\n\nCOMPANY results follow."
    );
    assert_eq!(out.stats.restored_texts, 1);

    let config = ConversionConfig::builder()
        .restoration(RestorationPolicy::Disabled)
        .build()
        .unwrap();
    let out = convert_document(&mut doc(), Path::new("r.pdf"), &config).unwrap();
    assert!(out.markdown.contains("C0MPANY results follow."));
    assert_eq!(out.stats.restored_texts, 0);
}

#[test]
fn test_codes_without_vocabulary_evidence_survive() {
    let mut doc = MemoryDocument::new().with_page(
        MemoryPage::new().block("Order X500 shipped with part A1B2.", 100.0, 11.0, false),
    );
    let md = run(&mut doc, &ConversionConfig::default()).unwrap();
    assert_eq!(md, "Order X500 shipped with part A1B2.");
}

#[test]
fn test_mixed_structure_document() {
    let mut doc = MemoryDocument::new().with_page(
        MemoryPage::new()
            .block("User Guide", 40.0, 26.0, true)
            .block("- Install the package", 120.0, 11.0, false)
            .block("- Run the binary", 134.0, 11.0, false)
            .block("def main(): pass", 200.0, 10.0, false)
            .block("That is all there is to it.", 260.0, 11.0, false),
    );
    let md = run(&mut doc, &ConversionConfig::default()).unwrap();

    assert!(md.starts_with("# User Guide\n\n"), "got: {md}");
    assert!(md.contains("- Install the package\n- Run the binary"));
    assert!(md.contains("```\ndef main(): pass\n```"));
    assert!(md.ends_with("That is all there is to it."));
    assert_markdown_quality(&md, "mixed");
}

#[test]
fn test_metadata_title_wins() {
    let mut doc = MemoryDocument::new().with_title("Annual Report 2024").with_page(
        MemoryPage::new()
            .block("Overview", 40.0, 24.0, true)
            .block("Body text for the report.", 90.0, 11.0, false),
    );
    let out =
        convert_document(&mut doc, Path::new("a.pdf"), &ConversionConfig::default()).unwrap();
    assert_eq!(out.title.as_deref(), Some("Annual Report 2024"));
    assert_eq!(out.metadata.page_count, 1);
}

#[test]
fn test_progress_callback_sees_every_page() {
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }
    impl ConversionProgressCallback for Recorder {
        fn on_conversion_start(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn on_page_complete(&self, page: usize, _total: usize, blocks: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page {page} ok {blocks}"));
        }
        fn on_page_error(&self, page: usize, _total: usize, _error: String) {
            self.events.lock().unwrap().push(format!("page {page} err"));
        }
        fn on_conversion_complete(&self, total: usize, success: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {total}/{success}"));
        }
    }

    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let mut doc = MemoryDocument::new()
        .with_page(
            MemoryPage::new()
                .block("One.", 100.0, 11.0, false)
                .block("Two.", 300.0, 11.0, false),
        )
        .with_page(MemoryPage::new().failing("boom"));
    run(&mut doc, &config).unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        ["start 2", "page 1 ok 2", "page 2 err", "done 2/1"]
    );
}

#[test]
fn test_conversion_output_is_json_serialisable() {
    let mut doc = MemoryDocument::new()
        .with_page(MemoryPage::new().block("Some text here.", 100.0, 11.0, false));
    let out = convert_document(&mut doc, Path::new("j.pdf"), &ConversionConfig::default())
        .unwrap();
    let json = serde_json::to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["markdown"], "Some text here.");
    assert_eq!(value["stats"]["blocks"], 1);
}

// ── Input validation and output files ────────────────────────────────────────

#[tokio::test]
async fn test_non_pdf_extension_is_invalid_format() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, "plain text").unwrap();
    let err = convert(&txt, &ConversionConfig::default()).await.unwrap_err();
    assert!(matches!(err, Pdf2MdError::InvalidFormat { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let err = convert("/nonexistent/file.pdf", &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2MdError::FileNotFound { .. }), "got {err:?}");

    let err = inspect("/nonexistent/file.pdf").await.unwrap_err();
    assert!(matches!(err, Pdf2MdError::FileNotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_pdf_extension_without_magic_is_invalid_format() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("fake.pdf");
    std::fs::write(&fake, "<html>not a pdf</html>").unwrap();
    let err = convert_to_file(&fake, None, &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2MdError::InvalidFormat { .. }), "got {err:?}");
    assert!(!dir.path().join("markdown_output").exists());
}

#[tokio::test]
async fn test_title_named_output_is_written_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan_0042.pdf");
    let config = ConversionConfig::default();

    let target = resolve_output_path(&input, None, Some("Q3: Results / Outlook"), &config);
    assert_eq!(target.parent().unwrap(), dir.path().join("markdown_output"));
    let name = target.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with(".md"));
    assert!(!name.contains('/') && !name.contains(':'), "got {name}");

    write_markdown(&target, "# Q3\n\nBody").await.unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Q3\n\nBody");
    assert!(!target.with_extension("md.tmp").exists());

    let fallback = resolve_output_path(&input, None, None, &config);
    assert_eq!(
        fallback.file_name().unwrap().to_string_lossy(),
        "scan0042.md"
    );
}

// ── Real PDFs (gated) ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_sample_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let meta = inspect(&path).await.expect("inspect failed");
    println!("sample.pdf: {} pages, title {:?}", meta.page_count, meta.title);
    assert!(meta.page_count > 0);
}

#[tokio::test]
async fn test_convert_sample_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let config = ConversionConfig::builder()
        .pages(PageSelection::Range(1, 3))
        .build()
        .unwrap();
    let out = convert(&path, &config).await.expect("conversion failed");

    println!(
        "sample.pdf: {} blocks, {} restored, {} errors, {}ms",
        out.stats.blocks, out.stats.restored_texts, out.stats.errors, out.stats.duration_ms
    );
    assert!(out.stats.selected_pages <= 3);
    assert!(out.stats.blocks > 0);
    assert_markdown_quality(&out.markdown, "sample.pdf");
}

#[tokio::test]
async fn test_convert_to_file_sample_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let dir = tempfile::tempdir().unwrap();
    let config = ConversionConfig::builder()
        .output_dir(dir.path())
        .build()
        .unwrap();
    let out = convert_to_file(&path, None, &config)
        .await
        .expect("conversion failed");

    let written = out.output_path.expect("output path set");
    assert!(written.starts_with(dir.path()));
    assert_eq!(std::fs::read_to_string(&written).unwrap(), out.markdown);
}

#[tokio::test]
async fn test_convert_from_bytes_sample_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    let from_bytes = pdf2md_structure::convert_from_bytes(&bytes, &ConversionConfig::default())
        .await
        .expect("conversion failed");
    let from_path = convert(&path, &ConversionConfig::default())
        .await
        .expect("conversion failed");
    assert_eq!(from_bytes.markdown, from_path.markdown);
}
