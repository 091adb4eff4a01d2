//! Homoglyph mistype detection for mixed Cyrillic/Latin abbreviations.
//!
//! A token like `АBC` (Cyrillic А, Latin BC) renders identically to the
//! dictionary's `ABC`. The validator generates every substitution variant of
//! the token over a fixed look-alike letter map and checks which variants the
//! dictionary actually knows.

use crate::dictionary::Dictionary;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Upper bound on token length before variant generation is refused; the
/// search branches exponentially in the number of mappable characters.
pub const MAX_TOKEN_LEN: usize = 15;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// More than one distinct dictionary abbreviation is reachable by
    /// substitution from the same token. The dictionary itself is
    /// inconsistent; picking one silently would risk data loss.
    #[error("dictionary conflict for '{original}': matches {candidates:?}")]
    DictionaryConflict {
        original: String,
        candidates: Vec<String>,
    },
}

/// Which script a highlighted character belongs to, per the look-alike map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CharScript {
    Cyr,
    Lat,
}

/// One character of a validated token, annotated for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedChar {
    #[serde(rename = "char")]
    pub ch: char,
    #[serde(rename = "mismatchFlag")]
    pub mismatch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Outcome of validating one suspicious candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub original_form: String,
    /// The dictionary's canonical spelling, when exactly one variant matched.
    pub correct_form: Option<String>,
    /// Non-empty exactly when `correct_form` is set.
    pub descriptions: Vec<String>,
    pub highlighted: Vec<HighlightedChar>,
}

/// Bidirectional map between visually identical Cyrillic and Latin letters.
#[derive(Debug, Clone)]
pub struct HomoglyphMap {
    cyr2lat: HashMap<char, char>,
    lat2cyr: HashMap<char, char>,
}

impl Default for HomoglyphMap {
    fn default() -> Self {
        let pairs = [
            ('А', 'A'),
            ('В', 'B'),
            ('С', 'C'),
            ('Е', 'E'),
            ('Н', 'H'),
            ('К', 'K'),
            ('М', 'M'),
            ('О', 'O'),
            ('Р', 'P'),
            ('Т', 'T'),
            ('У', 'Y'),
            ('Х', 'X'),
        ];
        let mut cyr2lat = HashMap::new();
        let mut lat2cyr = HashMap::new();
        for (cyr, lat) in pairs {
            cyr2lat.insert(cyr, lat);
            lat2cyr.insert(lat, cyr);
            let (cyr_lower, lat_lower) = (
                cyr.to_lowercase().next().unwrap_or(cyr),
                lat.to_ascii_lowercase(),
            );
            cyr2lat.insert(cyr_lower, lat_lower);
            lat2cyr.insert(lat_lower, cyr_lower);
        }
        Self { cyr2lat, lat2cyr }
    }
}

impl HomoglyphMap {
    fn script_of(&self, ch: char) -> Option<CharScript> {
        if self.cyr2lat.contains_key(&ch) {
            Some(CharScript::Cyr)
        } else if self.lat2cyr.contains_key(&ch) {
            Some(CharScript::Lat)
        } else {
            None
        }
    }

    /// Token has at least one mappable character from each script.
    fn is_mixed(&self, token: &str) -> bool {
        token.chars().any(|c| self.cyr2lat.contains_key(&c))
            && token.chars().any(|c| self.lat2cyr.contains_key(&c))
    }

    fn has_mappable(&self, token: &str) -> bool {
        token.chars().any(|c| self.script_of(c).is_some())
    }

    /// All substitution variants of `token`, excluding `token` itself.
    ///
    /// Backtracks over each position, branching into keep / to-Latin /
    /// to-Cyrillic wherever the map allows. Recursion depth is the token
    /// length, which `MAX_TOKEN_LEN` keeps small.
    pub fn variants(&self, token: &str) -> BTreeSet<String> {
        let chars: Vec<char> = token.chars().collect();
        let mut results = BTreeSet::new();
        let mut current = String::with_capacity(token.len());
        self.backtrack(&chars, 0, &mut current, &mut results);
        results.remove(token);
        results
    }

    fn backtrack(
        &self,
        chars: &[char],
        i: usize,
        current: &mut String,
        results: &mut BTreeSet<String>,
    ) {
        if i == chars.len() {
            results.insert(current.clone());
            return;
        }
        let ch = chars[i];
        let saved = current.len();

        current.push(ch);
        self.backtrack(chars, i + 1, current, results);
        current.truncate(saved);

        if let Some(&lat) = self.cyr2lat.get(&ch) {
            current.push(lat);
            self.backtrack(chars, i + 1, current, results);
            current.truncate(saved);
        }
        if let Some(&cyr) = self.lat2cyr.get(&ch) {
            current.push(cyr);
            self.backtrack(chars, i + 1, current, results);
            current.truncate(saved);
        }
    }

    /// Character-by-character comparison of a token against the canonical
    /// dictionary form; differing positions are flagged with both scripts.
    fn highlight_against(&self, token: &str, correct: &str) -> Vec<HighlightedChar> {
        token
            .chars()
            .zip(correct.chars())
            .map(|(ch, corr)| {
                if ch == corr {
                    HighlightedChar {
                        ch,
                        mismatch: false,
                        tooltip: None,
                    }
                } else {
                    let tooltip = match (self.script_of(ch), self.script_of(corr)) {
                        (Some(a), Some(b)) => Some(format!("{a:?} in text, {b:?} '{corr}' in dictionary")),
                        _ => Some(format!("differs from '{corr}'")),
                    };
                    HighlightedChar {
                        ch,
                        mismatch: true,
                        tooltip,
                    }
                }
            })
            .collect()
    }

    /// Script tag per character, for tokens with no dictionary match.
    fn highlight_scripts(&self, token: &str) -> Vec<HighlightedChar> {
        token
            .chars()
            .map(|ch| {
                let tooltip = self.script_of(ch).map(|s| format!("{s:?}"));
                HighlightedChar {
                    ch,
                    mismatch: tooltip.is_some(),
                    tooltip,
                }
            })
            .collect()
    }
}

/// Decide whether `token` is a homoglyph mistype of a dictionary entry.
///
/// Returns `None` when the token contains no look-alike characters at all,
/// is over the length cap, or is single-script with no dictionary match
/// ("not mixed, no issue"). Returns a result with `correct_form` set when
/// exactly one dictionary abbreviation is reachable by substitution, or an
/// ambiguous result (no correct form) for a mixed token the dictionary does
/// not know.
pub fn validate(
    token: &str,
    dictionary: &Dictionary,
    map: &HomoglyphMap,
) -> Result<Option<ValidationResult>, ValidationError> {
    if !map.has_mappable(token) || token.chars().count() > MAX_TOKEN_LEN {
        return Ok(None);
    }
    if dictionary.contains(token) {
        // Already the canonical spelling.
        return Ok(None);
    }

    let matched: Vec<String> = map
        .variants(token)
        .into_iter()
        .filter(|v| dictionary.contains(v))
        .collect();

    match matched.len() {
        0 => {
            if map.is_mixed(token) {
                Ok(Some(ValidationResult {
                    original_form: token.to_string(),
                    correct_form: None,
                    descriptions: Vec::new(),
                    highlighted: map.highlight_scripts(token),
                }))
            } else {
                Ok(None)
            }
        }
        1 => {
            let correct = matched.into_iter().next().unwrap();
            let descriptions = dictionary.descriptions_for(&correct).to_vec();
            let highlighted = map.highlight_against(token, &correct);
            Ok(Some(ValidationResult {
                original_form: token.to_string(),
                correct_form: Some(correct),
                descriptions,
                highlighted,
            }))
        }
        _ => Err(ValidationError::DictionaryConflict {
            original: token.to_string(),
            candidates: matched,
        }),
    }
}
