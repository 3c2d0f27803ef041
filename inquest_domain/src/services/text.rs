// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Text Normalization and Tokenization
//!
//! Shared text services used by ingestion (normalization), the semantic
//! linker (shared concepts) and synthesis (sentence extraction).
//!
//! Normalization contract (applied to every extracted text before anything
//! else reads it): Unicode NFKC, C0/C1 control characters stripped,
//! whitespace collapsed to single spaces, trimmed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// PT/EN stop-words excluded from shared-concept extraction.
static STOP_WORDS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        // Portuguese
        "a", "o", "e", "de", "da", "do", "que", "em", "um", "uma", "umas", "para", "com", "não",
        "os", "as", "dos", "das", "pela", "pelo", "ao", "à", "no", "na", "por", "mais", "como",
        "mas", "foi", "ser", "tem", "seu", "sua", "entre", "era", "depois", "sem", "mesmo",
        // English
        "the", "and", "of", "to", "in", "is", "for", "on", "with", "as", "by", "at", "be", "this",
        "that", "it", "from", "or", "an", "are", "was", "were", "been", "has", "have", "had",
        "will", "would", "there", "their", "they", "which", "about", "into", "than", "then",
    ]
    .into_iter()
    .collect()
});

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1f\x7f\u{80}-\u{9f}]").expect("control char regex"));

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static WORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-ZÀ-ÿ]{3,}").expect("word regex"));

/// Minimum length of a content word counted as a concept.
pub const MIN_CONCEPT_LEN: usize = 4;

/// Normalizes extracted text: NFKC, control characters to spaces, whitespace
/// collapsed, trimmed. Empty input maps to an empty string.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let composed: String = text.nfkc().collect();
    let no_controls = CONTROL_CHARS.replace_all(&composed, " ");
    WHITESPACE_RUNS.replace_all(&no_controls, " ").trim().to_string()
}

/// Splits text into sentences on `.`, `!`, `?`, keeping fragments longer than
/// ten characters.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() > 10)
        .collect()
}

/// First sentence longer than 15 characters, truncated to `max_len`. Used as
/// a narrative-thread title.
pub fn first_informative_sentence(text: &str, max_len: usize) -> Option<String> {
    sentences(text)
        .into_iter()
        .find(|s| s.len() > 15)
        .map(|s| truncate(s, max_len))
}

/// Content words of a text: length ≥ [`MIN_CONCEPT_LEN`], lowercased, minus
/// stop-words. Only the given character budget of the input is considered.
pub fn concept_words(text: &str, budget: usize) -> BTreeSet<String> {
    let window = slice_chars(text, budget);
    WORD_CHARS
        .find_iter(window)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= MIN_CONCEPT_LEN && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Truncates to at most `max_len` characters on a char boundary.
pub fn truncate(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

/// Returns a prefix of at most `budget` characters without splitting a char.
pub fn slice_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// A ±context window (in characters) around a byte span, newlines flattened.
pub fn context_window(text: &str, start: usize, end: usize, margin: usize) -> String {
    let lo = text[..start.min(text.len())]
        .char_indices()
        .rev()
        .nth(margin.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let hi = text[end.min(text.len())..]
        .char_indices()
        .nth(margin)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[lo..hi].replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_controls() {
        let input = "Hello\x00\x1fworld\n\n  again\t ";
        assert_eq!(normalize(input), "Hello world again");
    }

    #[test]
    fn normalize_applies_nfkc() {
        // Fullwidth digits compose to ASCII under NFKC
        assert_eq!(normalize("１２３"), "123");
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn concept_words_filter_stop_words_and_short_words() {
        let words = concept_words("the contrato and pagamento of ltd", 1000);
        assert!(words.contains("contrato"));
        assert!(words.contains("pagamento"));
        assert!(!words.contains("the"));
        assert!(!words.contains("ltd")); // below MIN_CONCEPT_LEN
    }

    #[test]
    fn concept_words_respect_budget() {
        let text = format!("{} pagamento", "x".repeat(3000));
        let words = concept_words(&text, 3000);
        assert!(!words.contains("pagamento"));
    }

    #[test]
    fn first_informative_sentence_skips_short_fragments() {
        let text = "Ok. This sentence is long enough to be a title. Short.";
        assert_eq!(
            first_informative_sentence(text, 150).unwrap(),
            "This sentence is long enough to be a title"
        );
    }

    #[test]
    fn context_window_flattens_newlines() {
        let text = "aaaa\nbbbb 15/01/2024 cccc\ndddd";
        let window = context_window(text, 10, 20, 5);
        assert!(!window.contains('\n'));
        assert!(window.contains("15/01/2024"));
    }
}
