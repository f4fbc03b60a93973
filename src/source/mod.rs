//! Page sources: where the pipeline gets its text spans from.
//!
//! The pipeline never talks to a PDF library directly. It consumes the
//! [`PageSource`] trait, which hands out each page as a list of
//! [`SourceBlock`]s in the order the backend emits them. Two implementations
//! ship with the crate:
//!
//! * [`pdfium::PdfiumDocument`] — real PDFs via `pdfium-render`
//! * [`memory::MemoryDocument`] — pre-extracted spans held in memory, used by
//!   tests and by callers that run their own extraction

pub mod memory;
pub mod pdfium;

use crate::error::PageError;
use crate::model::BoundingBox;
use crate::output::DocumentMetadata;
use serde::{Deserialize, Serialize};

/// A run of text sharing one font and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub text: String,
    pub bbox: BoundingBox,
    /// Font size in points; `0.0` when the backend could not tell.
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

/// One visual line of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLine {
    pub spans: Vec<SourceSpan>,
}

/// The backend's native paragraph-like grouping of lines.
///
/// A block without lines is an image or other non-text block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBlock {
    pub bbox: BoundingBox,
    pub lines: Vec<SourceLine>,
}

/// Supplies pages of text spans to the conversion pipeline.
///
/// Page indices are 0-based; the pipeline reports 1-based page numbers.
pub trait PageSource {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Document-level metadata.
    fn metadata(&self) -> DocumentMetadata;

    /// The text blocks of one page, in emission order.
    fn page_blocks(&mut self, index: usize) -> Result<Vec<SourceBlock>, PageError>;

    /// Plain text of one page, used for title detection.
    fn page_text(&mut self, index: usize) -> Result<String, PageError>;
}
