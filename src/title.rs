//! Document title detection and file-name sanitising.
//!
//! The title is only used to name output files. Sources, in priority order:
//!
//! 1. The document's metadata title, if longer than 3 characters
//! 2. The first heading among the first 50 blocks, 6–199 characters long
//! 3. The first substantial line (11–199 characters, not a bare page number
//!    or a "Page …" header) among the first five non-empty lines of the first
//!    two pages
//!
//! [`sanitize_title`] turns whatever was found into something safe to use as
//! a file stem on every major file system.

use crate::model::{BlockType, TextBlock};
use once_cell::sync::Lazy;
use regex::Regex;

/// Stem used when no usable title can be derived.
pub const FALLBACK_TITLE: &str = "document";

/// Blocks scanned for a heading title.
const HEADING_SCAN_LIMIT: usize = 50;
/// Non-empty lines of page text scanned for a title line.
const LINE_SCAN_LIMIT: usize = 5;
/// Pages whose text is scanned for a title line.
pub const TITLE_PAGES: usize = 2;

static RE_HEADING_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s+").unwrap());
static RE_DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static RE_ILLEGAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static RE_MARKDOWN_SYNTAX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|\*|`|_").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Find a raw (unsanitised) title.
///
/// `first_pages_text` is only called when neither the metadata nor the
/// headings yield a title, so the page source is not read unnecessarily.
pub fn extract_title(
    metadata_title: Option<&str>,
    blocks: &[TextBlock],
    first_pages_text: impl FnOnce() -> Vec<String>,
) -> Option<String> {
    if let Some(title) = metadata_title.map(str::trim) {
        if title.chars().count() > 3 {
            return Some(title.to_string());
        }
    }

    if let Some(title) = title_from_headings(blocks) {
        return Some(title);
    }

    title_from_lines(&first_pages_text())
}

fn title_from_headings(blocks: &[TextBlock]) -> Option<String> {
    blocks
        .iter()
        .take(HEADING_SCAN_LIMIT)
        .filter(|b| b.block_type == BlockType::Heading)
        .map(|b| RE_HEADING_PREFIX.replace(b.text.trim(), "").to_string())
        .find(|text| (6..200).contains(&text.chars().count()))
}

fn title_from_lines(pages: &[String]) -> Option<String> {
    pages.iter().take(TITLE_PAGES).find_map(|text| {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(LINE_SCAN_LIMIT)
            .find(|line| {
                (11..200).contains(&line.chars().count())
                    && !RE_DIGITS_ONLY.is_match(line)
                    && !line.to_lowercase().starts_with("page")
            })
            .map(str::to_string)
    })
}

/// Make `title` safe for use as a file stem.
///
/// Removes characters illegal in file names and Markdown emphasis syntax,
/// collapses whitespace, and cuts to at most `max_len` characters at a word
/// boundary. Never returns an empty string.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let s = RE_ILLEGAL_CHARS.replace_all(title, "");
    let s = RE_HEADING_PREFIX.replace(s.trim_start(), "");
    let s = RE_MARKDOWN_SYNTAX.replace_all(&s, "");
    let s = RE_WHITESPACE.replace_all(&s, " ");
    let mut s = s.trim().to_string();

    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len).collect();
        s = match cut.rsplit_once(' ') {
            Some((head, _)) => head.trim_end().to_string(),
            None => cut,
        };
    }

    if s.chars().count() < 3 {
        FALLBACK_TITLE.to_string()
    } else {
        s
    }
}
