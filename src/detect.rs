//! Abbreviation candidate detection and context-window retrieval.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// A token provisionally identified as an abbreviation, with its in-text
/// occurrence count and surrounding snippets for human disambiguation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbbreviationCandidate {
    pub text: String,
    pub occurrence_count: usize,
    pub contexts: Vec<String>,
}

fn roman_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:[IVXLCDM]+(?:-[IVXLCDM]+)?)[A-Za-zА-Яа-яёЁ]*$").unwrap()
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"«\S+»").unwrap())
}

fn uppercase_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-ZА-ЯЁ].*[A-ZА-ЯЁ]").unwrap())
}

/// Strip surrounding punctuation and unmatched parentheses from a raw token.
///
/// Balance-aware: `(ABC)` becomes `ABC`, while `IgG(1)` keeps its
/// parentheses because the `(` is matched inside the token.
fn clean_token(raw: &str) -> String {
    let mut token = raw.trim_matches([':', ';', ',', '.', '»', '«', ']', '[']);

    if let Some(rest) = token.strip_prefix('(') {
        token = rest;
    }
    if token.ends_with(')') && !token.contains('(') {
        token = token.trim_end_matches(')');
    }

    token.trim_matches(['»', '«', ']', '[']).to_string()
}

/// Scan text for abbreviation-shaped tokens and count occurrences.
///
/// A token qualifies when it contains at least two uppercase letters (Latin
/// or Cyrillic). Guillemet-quoted words, pure Roman numerals, excluded terms
/// and long purely alphabetic tokens (ordinary capitalized words) are
/// filtered out.
pub fn extract_candidates(text: &str, exclude_terms: &HashSet<String>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    let no_quotes = quoted_re().replace_all(text, "");
    for word in no_quotes.split_whitespace() {
        if !uppercase_pair_re().is_match(word) {
            continue;
        }

        let token = clean_token(word);
        if token.is_empty() {
            continue;
        }
        if roman_re().is_match(&token) {
            continue;
        }
        if exclude_terms.contains(&token) {
            continue;
        }
        if token.chars().count() > 8 && token.chars().all(char::is_alphabetic) {
            continue;
        }

        *counts.entry(token).or_insert(0) += 1;
    }

    counts
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offsets of whole-token occurrences of `token` in `text`.
///
/// The token must not be adjacent to a word character on either side, so
/// substrings of longer tokens never match.
fn token_positions(text: &str, token: &str) -> Vec<(usize, usize)> {
    if token.is_empty() {
        return Vec::new();
    }
    text.match_indices(token)
        .filter(|(start, matched)| {
            let before_ok = text[..*start].chars().next_back().map_or(true, |c| !is_word_char(c));
            let after_ok = text[start + matched.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
            before_ok && after_ok
        })
        .map(|(start, matched)| (start, start + matched.len()))
        .collect()
}

/// Whether `text` contains `token` as a whole token, per the same boundary
/// rule as context retrieval. Used to sweep the dictionary for known
/// abbreviations the case heuristic missed.
pub fn contains_whole_token(text: &str, token: &str) -> bool {
    !token_positions(text, token).is_empty()
}

/// Step `n` characters back from byte offset `pos`, staying on a boundary.
fn back_n_chars(text: &str, pos: usize, n: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(pos, |(i, _)| i)
}

/// Step `n` characters forward from byte offset `pos`, staying on a boundary.
fn forward_n_chars(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| pos + i)
}

/// Return up to `max_contexts` distinct snippets of `window` characters on
/// either side of each whole-token occurrence of `token`.
///
/// Snippets are emitted in first-occurrence order, wrapped with `...` where
/// they were truncated, and deduplicated by content.
pub fn find_contexts(
    text: &str,
    token: &str,
    window: usize,
    max_contexts: Option<usize>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut contexts = Vec::new();

    for (start, end) in token_positions(text, token) {
        let ctx_start = back_n_chars(text, start, window);
        let ctx_end = forward_n_chars(text, end, window);

        let mut snippet = text[ctx_start..ctx_end].trim().to_string();
        if ctx_start > 0 {
            snippet = format!("...{snippet}");
        }
        if ctx_end < text.len() {
            snippet = format!("{snippet}...");
        }

        if seen.insert(snippet.clone()) {
            contexts.push(snippet);
        }
        if let Some(max) = max_contexts {
            if contexts.len() >= max {
                break;
            }
        }
    }

    contexts
}
