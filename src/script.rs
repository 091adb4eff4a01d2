//! Writing-system classification and bilingual phrase splitting.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Writing system of a string, detected by codepoint presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Russian,
    Latin,
    Mixed,
    Other,
}

fn cyrillic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Cyrillic}").unwrap())
}

fn latin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Latin}").unwrap())
}

/// Classify a string by which scripts appear in it.
///
/// Both Cyrillic and Latin present -> `Mixed`; only one -> that script;
/// neither (including the empty string) -> `Other`.
pub fn classify(s: &str) -> Script {
    let has_cyr = cyrillic_re().is_match(s);
    let has_lat = latin_re().is_match(s);
    match (has_cyr, has_lat) {
        (true, true) => Script::Mixed,
        (true, false) => Script::Russian,
        (false, true) => Script::Latin,
        (false, false) => Script::Other,
    }
}

/// Tokens are runs of letters/digits/underscore/hyphen with optional trailing
/// sentence punctuation; any other non-space character stands alone.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{Cyrillic}\p{Latin}\d_-]+[.,;:!?]?|\S").unwrap())
}

/// Split a bilingual phrase into its Russian-only and Latin-only parts.
///
/// Tokens classified `Mixed` or `Other` (digits, punctuation, quote marks)
/// appear in neither output. Trailing sentence punctuation is stripped from
/// both results.
pub fn split_by_language(text: &str) -> (String, String) {
    let mut russian: Vec<&str> = Vec::new();
    let mut latin: Vec<&str> = Vec::new();

    for token in token_re().find_iter(text) {
        match classify(token.as_str()) {
            Script::Russian => russian.push(token.as_str()),
            Script::Latin => latin.push(token.as_str()),
            Script::Mixed | Script::Other => {}
        }
    }

    let trim = |joined: String| {
        joined
            .trim_end_matches(['.', ',', ';', ':', '!', '?'])
            .to_string()
    };
    (trim(russian.join(" ")), trim(latin.join(" ")))
}
