//! Page source backed by pdfium via `pdfium-render`.
//!
//! ## Why a scoped accessor?
//!
//! A `PdfDocument` borrows the `Pdfium` bindings it was loaded from, and the
//! pdfium C++ library keeps the file open until the document is dropped.
//! [`with_pdfium_document`] owns both for the duration of a closure, so the
//! document handle is released on every exit path, including early `?`
//! returns and panics unwinding through the closure.
//!
//! ## From segments to blocks
//!
//! pdfium reports text as *segments*: runs of characters sharing a baseline
//! and font. It has no notion of paragraphs, so [`assemble_blocks`] rebuilds
//! one: segments whose vertical extents overlap form a line, and consecutive
//! lines separated by less than [`LINE_GAP_FACTOR`] line heights, with a
//! similar leading font size, form a block. A font size change starts a new
//! block so a heading does not swallow the paragraph underneath it.

use super::{PageSource, SourceBlock, SourceLine, SourceSpan};
use crate::error::{PageError, Pdf2MdError};
use crate::model::BoundingBox;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Lines closer than this many line heights belong to the same block.
pub const LINE_GAP_FACTOR: f32 = 0.8;

/// Relative font-size difference that splits two lines into separate blocks.
pub const FONT_CHANGE_TOLERANCE: f32 = 0.15;

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH`, a library in the working directory,
/// then the system library.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2MdError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
            Pdfium::bind_to_library(&path)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2MdError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Open `path`, hand the document to `f`, and close it afterwards.
pub fn with_pdfium_document<T>(
    path: &Path,
    password: Option<&str>,
    f: impl FnOnce(&mut PdfiumDocument<'_>) -> Result<T, Pdf2MdError>,
) -> Result<T, Pdf2MdError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2MdError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                Pdf2MdError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            Pdf2MdError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let mut doc = PdfiumDocument { document };
    info!("PDF loaded: {} pages", doc.page_count());
    f(&mut doc)
}

/// A loaded PDF exposed as a [`PageSource`].
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumDocument<'_> {
    fn load_page(&self, index: usize) -> Result<PdfPage<'_>, PageError> {
        let page_index = u16::try_from(index).map_err(|_| PageError::ExtractionFailed {
            page: index + 1,
            detail: "page index exceeds pdfium's range".to_string(),
        })?;
        self.document
            .pages()
            .get(page_index)
            .map_err(|e| PageError::ExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: self.page_count(),
        }
    }

    fn page_blocks(&mut self, index: usize) -> Result<Vec<SourceBlock>, PageError> {
        let page = self.load_page(index)?;
        let page_height = page.height().value;
        let text = page.text().map_err(|e| PageError::ExtractionFailed {
            page: index + 1,
            detail: format!("failed to read page text: {:?}", e),
        })?;

        let mut spans = Vec::new();
        for segment in text.segments().iter() {
            let content = segment.text();
            if content.trim().is_empty() {
                continue;
            }

            // pdfium uses a bottom-left origin; flip to top-down.
            let rect = segment.bounds();
            let bbox = BoundingBox::new(
                rect.left().value,
                page_height - rect.top().value,
                rect.right().value,
                page_height - rect.bottom().value,
            );
            let (font_size, font_name, is_bold, is_italic) = segment_style(&segment);

            spans.push(SourceSpan {
                text: content,
                bbox,
                font_size,
                font_name,
                is_bold,
                is_italic,
            });
        }

        debug!("Page {}: {} text segments", index + 1, spans.len());
        Ok(assemble_blocks(spans))
    }

    fn page_text(&mut self, index: usize) -> Result<String, PageError> {
        let page = self.load_page(index)?;
        let text = page.text().map_err(|e| PageError::ExtractionFailed {
            page: index + 1,
            detail: format!("failed to read page text: {:?}", e),
        })?;
        Ok(text.all())
    }
}

/// Style of a segment, taken from its first character.
fn segment_style(segment: &PdfPageTextSegment<'_>) -> (f32, String, bool, bool) {
    let Ok(chars) = segment.chars() else {
        return (0.0, String::new(), false, false);
    };

    let Some(first) = chars.iter().next() else {
        return (0.0, String::new(), false, false);
    };

    let font_size = first.scaled_font_size().value;
    let font_name = first.font_name();
    let weight_is_bold = match first.font_weight() {
        Some(PdfFontWeight::Weight600)
        | Some(PdfFontWeight::Weight700Bold)
        | Some(PdfFontWeight::Weight800)
        | Some(PdfFontWeight::Weight900) => true,
        Some(PdfFontWeight::Custom(weight)) => weight >= 600,
        _ => false,
    };
    let is_bold = weight_is_bold || first.font_is_bold_reenforced();
    let is_italic = first.font_is_italic();

    (font_size, font_name, is_bold, is_italic)
}

/// Rebuild lines and blocks from spans in emission order.
pub fn assemble_blocks(spans: Vec<SourceSpan>) -> Vec<SourceBlock> {
    let mut lines: Vec<(BoundingBox, SourceLine)> = Vec::new();

    for span in spans {
        match lines.last_mut() {
            Some((bbox, line)) if same_line(bbox, &span.bbox) => {
                *bbox = bbox.union(&span.bbox);
                line.spans.push(span);
            }
            _ => {
                let bbox = span.bbox;
                lines.push((bbox, SourceLine { spans: vec![span] }));
            }
        }
    }

    let mut blocks: Vec<SourceBlock> = Vec::new();
    for (bbox, line) in lines {
        let joins = blocks.last().is_some_and(|block| continues_block(block, &bbox, &line));
        match blocks.last_mut() {
            Some(block) if joins => {
                block.bbox = block.bbox.union(&bbox);
                block.lines.push(line);
            }
            _ => blocks.push(SourceBlock {
                bbox,
                lines: vec![line],
            }),
        }
    }

    blocks
}

fn same_line(line: &BoundingBox, span: &BoundingBox) -> bool {
    let tolerance = line.height().max(span.height()) * 0.5;
    (line.center_y() - span.center_y()).abs() < tolerance
}

fn continues_block(block: &SourceBlock, bbox: &BoundingBox, line: &SourceLine) -> bool {
    let line_height = bbox.height().max(1.0);
    let gap = bbox.y0 - block.bbox.y1;
    if gap < -line_height * 0.5 || gap >= line_height * LINE_GAP_FACTOR {
        return false;
    }

    let previous = block.lines.last().and_then(leading_font_size);
    match (previous, leading_font_size(line)) {
        (Some(a), Some(b)) => (a - b).abs() <= a.max(b) * FONT_CHANGE_TOLERANCE,
        _ => true,
    }
}

fn leading_font_size(line: &SourceLine) -> Option<f32> {
    line.spans
        .iter()
        .map(|s| s.font_size)
        .find(|size| *size > 0.0)
}
