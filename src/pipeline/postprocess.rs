//! Post-processing: deterministic cleanup of rendered Markdown.
//!
//! ## Why is post-processing necessary?
//!
//! The renderer emits one fragment per block without looking at its
//! neighbours, so the concatenation carries seams:
//!
//! - Runs of blank lines where empty page regions or separators meet
//! - Emphasis markers colliding (`**bold***italic*` → `**bold***`)
//! - A heading line directly followed by text when a block carried its own
//!   newline
//! - Code fences sharing a line with their content when the PDF already
//!   contained inline triple backticks
//!
//! Each rule below is a pure `&str → String` pass fixing exactly one seam.
//!
//! ## Rule Order
//!
//! Emphasis rules run before heading spacing so the heading rule sees the
//! final marker layout, and trailing-whitespace stripping runs after the
//! list and fence rules because both can leave a dangling space behind.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Apply all post-processing rules to the rendered Markdown.
///
/// Rules (applied in order):
/// 1. Collapse 4+ consecutive newlines to exactly 3
/// 2. Collapse quadruple-asterisk emphasis into `**bold**`
/// 3. Merge bold immediately followed by a stray `*` into `***bold***`
/// 4. Ensure a blank line after a heading followed by text
/// 5. Collapse a horizontal rule directly followed by another
/// 6. Remove empty list-item lines
/// 7. Put code fences on their own lines
/// 8. Trim trailing whitespace per line
/// 9. Trim the whole document
pub fn postprocess(input: &str) -> String {
    let s = collapse_blank_lines(input);
    let s = collapse_quadruple_emphasis(&s);
    let s = merge_bold_italic(&s);
    let s = normalise_heading_spacing(&s);
    let s = collapse_double_rules(&s);
    let s = remove_empty_list_items(&s);
    let s = isolate_code_fences(&s);
    let s = trim_trailing_whitespace(&s);
    s.trim().to_string()
}

// ── Rule 1: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 2: Quadruple asterisks ──────────────────────────────────────────────

static RE_QUADRUPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\*\*([^*]+)\*\*\*\*").unwrap());

fn collapse_quadruple_emphasis(input: &str) -> String {
    RE_QUADRUPLE.replace_all(input, "**$1**").to_string()
}

// ── Rule 3: Bold followed by a stray asterisk ────────────────────────────────

// The opening `**` must not follow another `*`, so `***x***` stays put.
static RE_BOLD_STRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^*])\*\*([^*]+)\*\*\*").unwrap());

fn merge_bold_italic(input: &str) -> String {
    RE_BOLD_STRAY.replace_all(input, "${1}***${2}***").to_string()
}

// ── Rule 4: Blank line after headings ────────────────────────────────────────

static RE_HEADING_THEN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^#+[ \t]+[^\n]+)\n([^\n#\s])").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    RE_HEADING_THEN_TEXT.replace_all(input, "$1\n\n$2").to_string()
}

// ── Rule 5: Double horizontal rules ──────────────────────────────────────────

static RE_DOUBLE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"---\n\n+---").unwrap());

fn collapse_double_rules(input: &str) -> String {
    RE_DOUBLE_RULE.replace_all(input, "---").to_string()
}

// ── Rule 6: Empty list items ─────────────────────────────────────────────────

fn remove_empty_list_items(input: &str) -> String {
    input.replace("\n- \n", "\n")
}

// ── Rule 7: Code fences on their own lines ───────────────────────────────────

static RE_FENCED: Lazy<Regex> = Lazy::new(|| Regex::new(r"```([^`]+)```").unwrap());

fn isolate_code_fences(input: &str) -> String {
    RE_FENCED
        .replace_all(input, |caps: &Captures| {
            let inner = &caps[1];
            if inner.starts_with('\n') && inner.ends_with('\n') {
                caps[0].to_string()
            } else {
                format!("```\n{}\n```", inner.trim_matches('\n'))
            }
        })
        .to_string()
}

// ── Rule 8: Trim trailing whitespace per line ────────────────────────────────

static RE_TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

fn trim_trailing_whitespace(input: &str) -> String {
    RE_TRAILING_WS.replace_all(input, "").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_blank_lines() {
        let input = "a\n\n\n\n\n\nb";
        assert_eq!(collapse_blank_lines(input), "a\n\n\nb");
        assert_eq!(collapse_blank_lines("a\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn test_merge_bold_italic() {
        assert_eq!(merge_bold_italic("**Note***"), "***Note***");
        assert_eq!(merge_bold_italic("**Note**"), "**Note**");
        assert_eq!(merge_bold_italic("See **Note*** here"), "See ***Note*** here");
        assert_eq!(merge_bold_italic("***Note***"), "***Note***");
    }

    #[test]
    fn test_collapse_quadruple_emphasis() {
        assert_eq!(collapse_quadruple_emphasis("****Title****"), "**Title**");
    }

    #[test]
    fn test_heading_spacing() {
        let input = "# Heading\nmore text\n## Next\n\nbody";
        assert_eq!(
            normalise_heading_spacing(input),
            "# Heading\n\nmore text\n## Next\n\nbody"
        );
    }

    #[test]
    fn test_heading_followed_by_heading_untouched() {
        let input = "# One\n## Two";
        assert_eq!(normalise_heading_spacing(input), input);
    }

    #[test]
    fn test_collapse_double_rules() {
        assert_eq!(collapse_double_rules("a\n---\n\n---\nb"), "a\n---\nb");
        assert_eq!(collapse_double_rules("---\nx\n---"), "---\nx\n---");
    }

    #[test]
    fn test_remove_empty_list_items() {
        assert_eq!(remove_empty_list_items("- a\n- \n- b"), "- a\n- b");
    }

    #[test]
    fn test_isolate_code_fences() {
        assert_eq!(isolate_code_fences("```x = 1```"), "```\nx = 1\n```");
        assert_eq!(
            isolate_code_fences("```\nalready\n```"),
            "```\nalready\n```"
        );
        assert_eq!(isolate_code_fences("```\nhalf```"), "```\nhalf\n```");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld \t"),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_full_pipeline() {
        let input = "# INVOICE\n\nTotal due: $100\n\n\n\n\n\n<!-- Page 2 -->\n\n- \n**Bold***  \n";
        assert_eq!(
            postprocess(input),
            "# INVOICE\n\nTotal due: $100\n\n\n<!-- Page 2 -->\n\n***Bold***"
        );
        assert_eq!(postprocess("****Title****"), "**Title**");
        assert_eq!(postprocess("***Both***"), "***Both***");
    }

    #[test]
    fn test_idempotent() {
        let input = "# T\ntext\n\n\n\n\n```a```\n- \n**x*** and ****y****\nend  ";
        let once = postprocess(input);
        assert_eq!(postprocess(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(postprocess(""), "");
        assert_eq!(postprocess("\n\n  \n"), "");
    }
}
