//! Block extraction: turn a page's source blocks into [`ExtractedBlock`]s.
//!
//! Every source block with at least one text-bearing span becomes one
//! extracted block. Span texts are joined with single spaces and normalised;
//! the block's font and style come from its first non-blank span. Blocks
//! without lines (images) or whose text normalises to nothing are dropped.
//!
//! Page failures are not fatal: [`extract_pages`] records a [`PageError`],
//! notifies the progress callback, and moves on to the next page.

use crate::error::PageError;
use crate::model::ExtractedBlock;
use crate::pipeline::normalize::normalize;
use crate::progress::ConversionProgressCallback;
use crate::source::{PageSource, SourceBlock};
use tracing::{debug, warn};

/// Blocks extracted from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBlocks {
    /// 1-indexed page number.
    pub page_num: usize,
    pub blocks: Vec<ExtractedBlock>,
}

/// Result of walking the selected pages of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Successfully extracted pages, in ascending page order.
    pub pages: Vec<PageBlocks>,
    /// One entry per page that failed and was skipped.
    pub diagnostics: Vec<PageError>,
}

impl Extraction {
    /// Total number of blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }
}

/// Convert one page's source blocks.
pub fn blocks_from_source(
    source_blocks: &[SourceBlock],
    page_num: usize,
    default_font_size: f32,
) -> Vec<ExtractedBlock> {
    source_blocks
        .iter()
        .filter_map(|block| extract_block(block, page_num, default_font_size))
        .collect()
}

fn extract_block(
    block: &SourceBlock,
    page_num: usize,
    default_font_size: f32,
) -> Option<ExtractedBlock> {
    let mut raw = String::new();
    let mut style = None;

    for span in block.lines.iter().flat_map(|l| l.spans.iter()) {
        if span.text.trim().is_empty() {
            continue;
        }
        raw.push_str(&span.text);
        raw.push(' ');
        if style.is_none() {
            style = Some(span);
        }
    }

    let first = style?;
    let text = normalize(&raw);
    if text.is_empty() {
        return None;
    }

    let font_size = if first.font_size > 0.0 {
        first.font_size
    } else {
        default_font_size
    };

    Some(ExtractedBlock {
        text,
        bbox: block.bbox,
        font_size,
        font_name: first.font_name.clone(),
        is_bold: first.is_bold,
        is_italic: first.is_italic,
        page_num,
    })
}

/// Extract the pages at `indices` (0-based, ascending) from `source`.
pub fn extract_pages<S: PageSource + ?Sized>(
    source: &mut S,
    indices: &[usize],
    default_font_size: f32,
    progress: &dyn ConversionProgressCallback,
) -> Extraction {
    let total = indices.len();
    let mut extraction = Extraction::default();
    progress.on_conversion_start(total);

    for &index in indices {
        let page_num = index + 1;
        progress.on_page_start(page_num, total);

        match source.page_blocks(index) {
            Ok(source_blocks) => {
                let blocks = blocks_from_source(&source_blocks, page_num, default_font_size);
                debug!(
                    "Page {}: {} source blocks -> {} text blocks",
                    page_num,
                    source_blocks.len(),
                    blocks.len()
                );
                progress.on_page_complete(page_num, total, blocks.len());
                extraction.pages.push(PageBlocks { page_num, blocks });
            }
            Err(e) => {
                warn!("Skipping page {}: {}", page_num, e);
                progress.on_page_error(page_num, total, e.to_string());
                extraction.diagnostics.push(e);
            }
        }
    }

    progress.on_conversion_complete(total, extraction.pages.len());
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;
    use crate::progress::NoopProgressCallback;
    use crate::source::memory::{MemoryDocument, MemoryPage};
    use crate::source::{SourceLine, SourceSpan};

    fn span(text: &str, size: f32, bold: bool) -> SourceSpan {
        SourceSpan {
            text: text.into(),
            bbox: BoundingBox::default(),
            font_size: size,
            font_name: if bold { "Arial-Bold" } else { "Arial" }.into(),
            is_bold: bold,
            is_italic: false,
        }
    }

    fn block(lines: Vec<Vec<SourceSpan>>) -> SourceBlock {
        SourceBlock {
            bbox: BoundingBox::new(0.0, 10.0, 100.0, 30.0),
            lines: lines.into_iter().map(|spans| SourceLine { spans }).collect(),
        }
    }

    #[test]
    fn joins_spans_and_takes_first_style() {
        let b = block(vec![
            vec![span("  ", 30.0, false), span("Annual", 18.0, true)],
            vec![span("report", 10.0, false)],
        ]);
        let out = blocks_from_source(&[b], 3, 12.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Annual report");
        assert_eq!(out[0].font_size, 18.0);
        assert!(out[0].is_bold);
        assert_eq!(out[0].font_name, "Arial-Bold");
        assert_eq!(out[0].page_num, 3);
    }

    #[test]
    fn missing_font_size_falls_back_to_default() {
        let out = blocks_from_source(&[block(vec![vec![span("text", 0.0, false)]])], 1, 12.0);
        assert_eq!(out[0].font_size, 12.0);
    }

    #[test]
    fn image_and_blank_blocks_are_skipped() {
        let image = SourceBlock {
            bbox: BoundingBox::default(),
            lines: Vec::new(),
        };
        let blank = block(vec![vec![span(" \t ", 12.0, false)]]);
        // Only control characters: non-blank before normalisation, empty after.
        let control = block(vec![vec![span("\u{0007}", 12.0, false)]]);
        assert!(blocks_from_source(&[image, blank, control], 1, 12.0).is_empty());
    }

    #[test]
    fn failing_page_is_recorded_and_skipped() {
        let mut doc = MemoryDocument::new()
            .with_page(MemoryPage::new().block("first page", 10.0, 12.0, false))
            .with_page(MemoryPage::new().failing("broken xref"))
            .with_page(MemoryPage::new().block("third page", 10.0, 12.0, false));

        let extraction = extract_pages(&mut doc, &[0, 1, 2], 12.0, &NoopProgressCallback);
        assert_eq!(extraction.pages.len(), 2);
        assert_eq!(extraction.pages[1].page_num, 3);
        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics[0].page(), 2);
        assert_eq!(extraction.block_count(), 2);
    }

    #[test]
    fn only_selected_pages_are_read() {
        let mut doc = MemoryDocument::new()
            .with_page(MemoryPage::new().failing("never read"))
            .with_page(MemoryPage::new().block("second", 10.0, 12.0, false));
        let extraction = extract_pages(&mut doc, &[1], 12.0, &NoopProgressCallback);
        assert!(extraction.diagnostics.is_empty());
        assert_eq!(extraction.pages[0].blocks[0].text, "second");
    }
}
