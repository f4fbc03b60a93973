//! Block classification: assign each extracted block a [`BlockType`].
//!
//! Classification is an ordered table of pure predicates ([`RULES`]). The
//! first rule that matches decides the type; a block no rule claims is a
//! paragraph. Heading rules come first, so a short uppercase line that also
//! looks like a list item is still a heading.
//!
//! The only cross-block input is the page's mean font size, computed once per
//! page into a [`PageContext`] and passed to every predicate.

use crate::config::ConversionConfig;
use crate::model::{BlockType, ExtractedBlock, TextBlock};
use once_cell::sync::Lazy;
use regex::Regex;

/// Page-level facts the rules may consult.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageContext {
    /// Mean of the positive font sizes on the page; `None` when there are none.
    pub mean_font_size: Option<f32>,
}

impl PageContext {
    pub fn from_blocks(blocks: &[ExtractedBlock]) -> Self {
        let (sum, count) = blocks
            .iter()
            .map(|b| b.font_size)
            .filter(|s| *s > 0.0)
            .fold((0.0f32, 0usize), |(sum, n), s| (sum + s, n + 1));
        Self {
            mean_font_size: (count > 0).then(|| sum / count as f32),
        }
    }
}

/// A single classification rule.
pub struct Rule {
    pub name: &'static str,
    pub block_type: BlockType,
    pub matches: fn(&ExtractedBlock, &PageContext, &ConversionConfig) -> bool,
}

/// Rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "large-font",
        block_type: BlockType::Heading,
        matches: is_large_for_page,
    },
    Rule {
        name: "short-bold",
        block_type: BlockType::Heading,
        matches: is_short_bold,
    },
    Rule {
        name: "heading-pattern",
        block_type: BlockType::Heading,
        matches: matches_heading_pattern,
    },
    Rule {
        name: "list-marker",
        block_type: BlockType::List,
        matches: matches_list_marker,
    },
    Rule {
        name: "code-token",
        block_type: BlockType::Code,
        matches: has_code_token,
    },
];

/// Classify one block. Blank text is always a paragraph.
pub fn classify(block: &ExtractedBlock, ctx: &PageContext, config: &ConversionConfig) -> BlockType {
    if block.text.trim().is_empty() {
        return BlockType::Paragraph;
    }
    RULES
        .iter()
        .find(|rule| (rule.matches)(block, ctx, config))
        .map(|rule| rule.block_type)
        .unwrap_or_default()
}

/// Classify every block of one page.
pub fn classify_page(blocks: Vec<ExtractedBlock>, config: &ConversionConfig) -> Vec<TextBlock> {
    let ctx = PageContext::from_blocks(&blocks);
    blocks
        .into_iter()
        .map(|b| {
            let block_type = classify(&b, &ctx, config);
            b.with_type(block_type)
        })
        .collect()
}

// ── Heading rules ────────────────────────────────────────────────────────

fn is_large_for_page(block: &ExtractedBlock, ctx: &PageContext, config: &ConversionConfig) -> bool {
    ctx.mean_font_size
        .is_some_and(|mean| block.font_size >= mean * config.heading_size_ratio)
}

fn is_short_bold(block: &ExtractedBlock, _: &PageContext, config: &ConversionConfig) -> bool {
    block.is_bold
        && block.text.chars().count() < config.bold_heading_max_chars
        && block.font_size > config.bold_heading_min_font_size
}

static RE_CHAPTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(chương|chapter|phần|section|mục|đề mục|part)\s+\d+").unwrap()
});

static RE_NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+\p{Lu}").unwrap());

static RE_ALL_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{Lu}\s]{1,100}$").unwrap());

fn matches_heading_pattern(block: &ExtractedBlock, _: &PageContext, _: &ConversionConfig) -> bool {
    let text = block.text.as_str();
    RE_CHAPTER.is_match(text) || RE_NUMBERED_HEADING.is_match(text) || RE_ALL_CAPS.is_match(text)
}

// ── List rule ────────────────────────────────────────────────────────────

static RE_LIST_MARKERS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"^[\w\-*•◦▪▫]\s+").unwrap(),
        Regex::new(r"^[-*•◦▪▫]\s+").unwrap(),
        Regex::new(r"^\d+[.)]\s+").unwrap(),
        Regex::new(r"^[a-z][.)]\s+").unwrap(),
    ]
});

fn matches_list_marker(block: &ExtractedBlock, _: &PageContext, _: &ConversionConfig) -> bool {
    RE_LIST_MARKERS.iter().any(|re| re.is_match(&block.text))
}

// ── Code rule ────────────────────────────────────────────────────────────

const CODE_TOKENS: &[&str] = &[
    "```", "def ", "class ", "import ", "function ", "var ", "const ", "public ", "private ",
    "static ", "void ", "int ", "string ", "<?php", "<?=", "<script", "</script>", "SELECT ",
    "FROM ",
];

/// Characters from the start of the block searched for code tokens.
const CODE_PREFIX_CHARS: usize = 50;

fn has_code_token(block: &ExtractedBlock, _: &PageContext, _: &ConversionConfig) -> bool {
    let end = block
        .text
        .char_indices()
        .nth(CODE_PREFIX_CHARS)
        .map_or(block.text.len(), |(i, _)| i);
    let prefix = &block.text[..end];
    CODE_TOKENS.iter().any(|token| prefix.contains(token))
}
