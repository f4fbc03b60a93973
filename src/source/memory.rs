//! In-memory page source.
//!
//! Holds pre-extracted pages so the pipeline can run without a PDF backend.
//! Pages are assembled with a small builder API:
//!
//! ```rust
//! use pdf2md_structure::source::memory::{MemoryDocument, MemoryPage};
//!
//! let doc = MemoryDocument::new()
//!     .with_title("Quarterly Report")
//!     .with_page(
//!         MemoryPage::new()
//!             .block("Quarterly Report", 50.0, 24.0, true)
//!             .block("Revenue grew in every region.", 90.0, 11.0, false),
//!     );
//! ```

use super::{PageSource, SourceBlock, SourceLine, SourceSpan};
use crate::error::PageError;
use crate::model::BoundingBox;
use crate::output::DocumentMetadata;

/// Left margin used by the convenience builders.
const LEFT: f32 = 72.0;
/// Right edge used by the convenience builders.
const RIGHT: f32 = 540.0;

/// One page of an in-memory document.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    blocks: Vec<SourceBlock>,
    fail_with: Option<String>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-line, single-span block whose top edge is at `top`.
    ///
    /// The block is one font size tall.
    pub fn block(self, text: &str, top: f32, font_size: f32, is_bold: bool) -> Self {
        self.styled_block(text, top, font_size, is_bold, false)
    }

    /// Like [`MemoryPage::block`] with an explicit italic flag.
    pub fn styled_block(
        self,
        text: &str,
        top: f32,
        font_size: f32,
        is_bold: bool,
        is_italic: bool,
    ) -> Self {
        let bbox = BoundingBox::new(LEFT, top, RIGHT, top + font_size);
        self.raw_block(SourceBlock {
            bbox,
            lines: vec![SourceLine {
                spans: vec![SourceSpan {
                    text: text.to_string(),
                    bbox,
                    font_size,
                    font_name: if is_bold { "Helvetica-Bold" } else { "Helvetica" }.to_string(),
                    is_bold,
                    is_italic,
                }],
            }],
        })
    }

    /// Append an image block (no text lines).
    pub fn image(self, top: f32, height: f32) -> Self {
        self.raw_block(SourceBlock {
            bbox: BoundingBox::new(LEFT, top, RIGHT, top + height),
            lines: Vec::new(),
        })
    }

    /// Append a fully specified block.
    pub fn raw_block(mut self, block: SourceBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Make every read of this page fail with `detail`.
    pub fn failing(mut self, detail: impl Into<String>) -> Self {
        self.fail_with = Some(detail.into());
        self
    }

    fn check(&self, index: usize) -> Result<(), PageError> {
        match &self.fail_with {
            Some(detail) => Err(PageError::ExtractionFailed {
                page: index + 1,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A document whose pages live in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
    metadata: DocumentMetadata,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    fn page(&self, index: usize) -> Result<&MemoryPage, PageError> {
        let page = self.pages.get(index).ok_or_else(|| PageError::ExtractionFailed {
            page: index + 1,
            detail: format!("no such page (document has {})", self.pages.len()),
        })?;
        page.check(index)?;
        Ok(page)
    }
}

impl PageSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            page_count: self.pages.len(),
            ..self.metadata.clone()
        }
    }

    fn page_blocks(&mut self, index: usize) -> Result<Vec<SourceBlock>, PageError> {
        Ok(self.page(index)?.blocks.clone())
    }

    fn page_text(&mut self, index: usize) -> Result<String, PageError> {
        let page = self.page(index)?;
        let lines: Vec<String> = page
            .blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(|line| {
                line.spans
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
