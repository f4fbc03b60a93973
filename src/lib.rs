//! # pdf2md-structure
//!
//! Reconstruct the logical structure of a PDF (headings, lists, code,
//! paragraphs, reading order) from its text spans and render it as Markdown.
//!
//! ## Why this crate?
//!
//! A PDF has no paragraphs, no headings and no lists: only positioned runs of
//! glyphs with a font attached. Plain text extraction flattens those runs into
//! one undifferentiated stream. This crate infers structure from typography
//! (relative font size, weight, style), geometry (vertical gaps) and text
//! patterns (numbering, bullets, code tokens), repairs common encoding damage
//! along the way, and emits readable Markdown. It works on already-extracted
//! text only; it is not an OCR engine and does not reproduce page layout
//! pixel-for-pixel.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Source     spans per page from pdfium (or any PageSource)
//!  ├─ 2. Extract    spans → normalised text blocks, first-span style
//!  ├─ 3. Classify   heading / list / code / paragraph, per-page font context
//!  ├─ 4. Group      vertically contiguous blocks on the same page
//!  ├─ 5. Render     Markdown fragments, digit→letter repair, page markers
//!  ├─ 6. Polish     post-processing rules (blank lines, emphasis, fences)
//!  └─ 7. Output     Markdown + stats + title + per-page diagnostics
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2md_structure::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} blocks, {} words repaired",
//!         output.stats.blocks,
//!         output.stats.restored_texts);
//!     Ok(())
//! }
//! ```
//!
//! Without a PDF at hand, run the same pipeline over an in-memory source:
//!
//! ```rust
//! use pdf2md_structure::source::memory::{MemoryDocument, MemoryPage};
//! use pdf2md_structure::{convert_document, ConversionConfig};
//! use std::path::Path;
//!
//! let mut doc = MemoryDocument::new().with_page(
//!     MemoryPage::new()
//!         .block("INVOICE", 50.0, 24.0, true)
//!         .block("Total due: $100", 94.0, 11.0, false),
//! );
//! let out = convert_document(&mut doc, Path::new("invoice.pdf"), &ConversionConfig::default())
//!     .unwrap();
//! assert_eq!(out.markdown, "# INVOICE\n\nTotal due: $100");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2md-structure = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Real PDFs are read through `pdfium-render`, which needs the pdfium shared
//! library at runtime. It is looked up via `PDFIUM_LIB_PATH`, then in the
//! working directory, then system-wide.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod title;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{convert_batch, BatchOptions, BatchReport};
pub use config::{
    ConversionConfig, ConversionConfigBuilder, HeadingLevels, PageSelection, PageSeparator,
    RestorationPolicy,
};
pub use convert::{
    convert, convert_document, convert_from_bytes, convert_sync, convert_to_file, inspect,
};
pub use error::{PageError, Pdf2MdError};
pub use model::{BlockType, BoundingBox, TextBlock};
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use source::PageSource;
