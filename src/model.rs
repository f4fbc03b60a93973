//! Structural data model shared by the pipeline stages.
//!
//! Block construction is two-phase: the extractor produces immutable
//! [`ExtractedBlock`]s, and the classifier turns each one into a
//! [`TextBlock`] carrying its [`BlockType`]. A block's type is therefore
//! fixed at construction and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// Structural role of a block in the rendered Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading,
    List,
    Code,
}

/// A block as produced by the extractor, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBlock {
    /// Normalised, non-empty text.
    pub text: String,
    pub bbox: BoundingBox,
    /// Always positive; falls back to the configured default size.
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    /// 1-indexed page number.
    pub page_num: usize,
}

impl ExtractedBlock {
    /// Attach the classifier's verdict, producing the final block.
    pub fn with_type(self, block_type: BlockType) -> TextBlock {
        TextBlock {
            text: self.text,
            bbox: self.bbox,
            font_size: self.font_size,
            font_name: self.font_name,
            is_bold: self.is_bold,
            is_italic: self.is_italic,
            block_type,
            page_num: self.page_num,
        }
    }
}

/// A classified block: the unit the layout grouper and renderer work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub bbox: BoundingBox,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub block_type: BlockType,
    pub page_num: usize,
}

/// A run of vertically contiguous blocks on one page.
///
/// Borrowed from the document's block list; never empty and never spans a
/// page boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Group<'a> {
    pub page_num: usize,
    pub blocks: &'a [TextBlock],
}

impl<'a> Group<'a> {
    /// Text of the last `n` blocks of the group.
    pub fn tail_texts(&self, n: usize) -> impl Iterator<Item = &'a str> {
        let start = self.blocks.len().saturating_sub(n);
        self.blocks[start..].iter().map(|b| b.text.as_str())
    }

    /// Text of the first `n` blocks of the group.
    pub fn head_texts(&self, n: usize) -> impl Iterator<Item = &'a str> {
        self.blocks.iter().take(n).map(|b| b.text.as_str())
    }
}
