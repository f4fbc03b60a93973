//! Text normalisation for raw span text.
//!
//! PDF text extraction splits words across spans, drops the space between
//! sentences, and leaves typographic glyphs that render inconsistently in
//! Markdown. [`normalize`] repairs those artefacts with a fixed sequence of
//! passes:
//!
//! 1. Drop Unicode control/format characters (keeping `\n`, `\t`, `\r`)
//! 2. Replace typographic look-alikes with canonical characters
//! 3. Split lowercase→uppercase collisions (`wordWord` → `word Word`)
//! 4. Split sentence-end→uppercase collisions (`end.Next` → `end. Next`)
//! 5. Collapse runs of spaces/tabs and strip trailing whitespace per line
//! 6. Trim the whole text
//!
//! Look-alikes are replaced before the spacing passes so that an ellipsis
//! glued to a capital (`wait…Then`) gets its space on the first pass, which
//! keeps the function idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CONTROL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Cc}\p{Cf}&&[^\n\t\r]]").unwrap());

static RE_CASE_COLLISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").unwrap());

static RE_SENTENCE_COLLISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])(\p{Lu})").unwrap());

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

static RE_TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Typographic look-alikes and their canonical replacements.
const LOOK_ALIKES: &[(char, &str)] = &[
    ('\u{201C}', "\""), // “
    ('\u{201D}', "\""), // ”
    ('\u{201E}', "\""), // „
    ('\u{2018}', "'"),  // ‘
    ('\u{2019}', "'"),  // ’
    ('\u{201A}', "'"),  // ‚
    ('\u{2026}', "..."), // …
    ('\u{25CF}', "•"),  // ●
    ('\u{2023}', "•"),  // ‣
    ('\u{2043}', "•"),  // ⁃
    ('\u{F0B7}', "•"),  // Symbol-font bullet from the private use area
    ('\u{2012}', "—"),  // figure dash
    ('\u{2015}', "—"),  // horizontal bar
    ('\u{2010}', "-"),  // hyphen
    ('\u{2011}', "-"),  // non-breaking hyphen
    ('\u{2212}', "-"),  // minus sign
    ('\u{00A0}', " "),  // no-break space
    ('\u{202F}', " "),  // narrow no-break space
];

/// Clean raw span text. Never fails; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let s = RE_CONTROL.replace_all(raw, "");
    let s = replace_look_alikes(&s);
    let s = RE_CASE_COLLISION.replace_all(&s, "$1 $2");
    let s = RE_SENTENCE_COLLISION.replace_all(&s, "$1 $2");
    let s = RE_HORIZONTAL_WS.replace_all(&s, " ");
    let s = RE_TRAILING_WS.replace_all(&s, "");
    s.trim().to_string()
}

fn replace_look_alikes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match LOOK_ALIKES.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}
