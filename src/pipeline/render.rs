//! Markdown rendering: walk the layout groups and emit Markdown fragments.
//!
//! ## Restoration context
//!
//! Before a block is emitted its text goes through the restorer. The
//! vocabulary for a group is built once from the group's own blocks plus the
//! last `context_window` blocks of the previous group and the first
//! `context_window` blocks of the next one. Neighbouring groups usually share
//! terminology, and keeping the window local means a word repaired on page 40
//! never depends on text from page 2.
//!
//! ## Spacing
//!
//! Every fragment ends in its own newline(s); list items end in one so that
//! consecutive items stay a tight list, everything else ends in a blank line.
//! A paragraph right after a list gets an extra leading newline to close the
//! list. The post-processor evens out whatever excess this produces.

use crate::config::{ConversionConfig, HeadingLevels};
use crate::model::{BlockType, Group, TextBlock};
use crate::pipeline::restore::{restore, Vocabulary};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub markdown: String,
    /// Words rewritten by the restorer across the whole document.
    pub restored_texts: usize,
}

/// Render `groups` in order.
pub fn render(groups: &[Group<'_>], config: &ConversionConfig) -> Rendered {
    let substitutions = config.restoration.substitutions();
    let window = config.context_window;

    let mut out = Rendered::default();
    let mut prev_page = 0usize;
    let mut prev_type: Option<BlockType> = None;

    for (i, group) in groups.iter().enumerate() {
        let vocabulary = if substitutions.is_empty() {
            Vocabulary::default()
        } else {
            let prev = i.checked_sub(1).map(|p| groups[p].tail_texts(window));
            let next = groups.get(i + 1).map(|n| n.head_texts(window));
            Vocabulary::from_texts(
                group
                    .blocks
                    .iter()
                    .map(|b| b.text.as_str())
                    .chain(prev.into_iter().flatten())
                    .chain(next.into_iter().flatten()),
            )
        };
        debug!(
            "Group {} (page {}): {} blocks, {} context words",
            i,
            group.page_num,
            group.blocks.len(),
            vocabulary.len()
        );

        for block in group.blocks {
            let restored = restore(&block.text, &vocabulary, substitutions);
            out.restored_texts += restored.substitutions;

            let text = restored.text.trim();
            if text.is_empty() {
                continue;
            }

            if block.page_num > prev_page && prev_page > 0 {
                if let Some(marker) = config.page_separator.render(block.page_num) {
                    out.markdown.push_str(&marker);
                }
            }
            prev_page = block.page_num;

            render_block(&mut out.markdown, block, text, prev_type, &config.heading_levels);
            prev_type = Some(block.block_type);
        }
    }

    out
}

static RE_NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]").unwrap());
static RE_BULLET_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]").unwrap());
static RE_BOLD_WRAPPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*.*\*\*").unwrap());
static RE_ITALIC_WRAPPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*.*\*").unwrap());

fn render_block(
    out: &mut String,
    block: &TextBlock,
    text: &str,
    prev_type: Option<BlockType>,
    levels: &HeadingLevels,
) {
    match block.block_type {
        BlockType::Heading => {
            let level = levels.level_for(block.font_size);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(text);
            out.push_str("\n\n");
        }
        BlockType::List => {
            if RE_NUMBERED_ITEM.is_match(text) || RE_BULLET_ITEM.is_match(text) {
                out.push_str(text);
            } else {
                out.push_str("- ");
                out.push_str(text);
            }
            out.push('\n');
        }
        BlockType::Code => {
            if text.starts_with("```") {
                out.push_str(text);
                out.push_str("\n\n");
            } else {
                out.push_str("```\n");
                out.push_str(text);
                out.push_str("\n```\n\n");
            }
        }
        BlockType::Paragraph => {
            let mut text = text.to_string();
            if block.is_bold && !RE_BOLD_WRAPPED.is_match(&text) {
                text = format!("**{}**", text);
            }
            if block.is_italic && !RE_ITALIC_WRAPPED.is_match(&text) && !text.contains("**") {
                text = format!("*{}*", text);
            }
            if prev_type == Some(BlockType::List) {
                out.push('\n');
            }
            out.push_str(&text);
            out.push_str("\n\n");
        }
    }
}
