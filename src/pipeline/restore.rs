//! Text restoration: repair letters that the PDF encoded as look-alike digits.
//!
//! Fonts with broken `ToUnicode` maps regularly turn `O` into `0` or `I` into
//! `1`. A word like `C0MPANY` is repaired only when the corrected spelling
//! (`COMPANY`, compared case-insensitively) appears in a [`Vocabulary`]
//! built from nearby text. Without that evidence the word is left alone, so
//! genuine codes such as `A1B2` or `X500` survive.
//!
//! The substitution table comes from [`crate::config::RestorationPolicy`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{L}+\b").unwrap());

/// Lowercased letter-only words seen in the surrounding text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut words = HashSet::new();
        for text in texts {
            for m in RE_WORD.find_iter(text) {
                words.insert(m.as_str().to_lowercase());
            }
        }
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

/// Output of [`restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub text: String,
    /// Number of words rewritten.
    pub substitutions: usize,
}

/// Repair digit-for-letter substitutions in `text`.
///
/// For every whitespace-separated word that contains a digit, is longer than
/// two characters and is not purely numeric, each `(digit, letter)` pair is
/// tried in order; the first whose result is in `vocabulary` wins. Rewritten
/// text is re-joined with single spaces. When nothing is rewritten the input
/// comes back untouched.
pub fn restore(text: &str, vocabulary: &Vocabulary, substitutions: &[(char, char)]) -> Restored {
    let unchanged = || Restored {
        text: text.to_string(),
        substitutions: 0,
    };

    if text.chars().count() < 2 || vocabulary.is_empty() || substitutions.is_empty() {
        return unchanged();
    }

    let mut count = 0;
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| match repair_word(word, vocabulary, substitutions) {
            Some(fixed) => {
                count += 1;
                fixed
            }
            None => word.to_string(),
        })
        .collect();

    if count == 0 {
        return unchanged();
    }

    Restored {
        text: words.join(" "),
        substitutions: count,
    }
}

fn repair_word(
    word: &str,
    vocabulary: &Vocabulary,
    substitutions: &[(char, char)],
) -> Option<String> {
    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let all_digits = word.chars().all(|c| c.is_ascii_digit());
    if !has_digit || all_digits || word.chars().count() <= 2 {
        return None;
    }

    substitutions
        .iter()
        .filter(|(digit, _)| word.contains(*digit))
        .map(|(digit, letter)| word.replace(*digit, &letter.to_string()))
        .find(|candidate| vocabulary.contains(&candidate.to_lowercase()))
}
