//! Dictionary model: entries, merge/dedup semantics, normalization and the
//! append requests the core hands back to whatever store owns the data.
//!
//! One abbreviation may map to several descriptions; that ambiguity is
//! first-class and stays until a human resolves it.

use crate::format::{capitalize_first_letter, format_description};
use crate::script::{self, Script};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::info;

/// One abbreviation with every description known for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub abbreviation: String,
    pub descriptions: Vec<String>,
}

impl DictionaryEntry {
    pub fn new(abbreviation: impl Into<String>, descriptions: Vec<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            descriptions,
        }
    }
}

/// Review state attached to an append request; the store keeps entries in
/// `for_review` until a human approves or rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Approved,
    ForReview,
    Rejected,
}

/// A single proposed addition, emitted only on an explicit approval action.
/// The core never deletes or edits existing approved entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendRequest {
    pub abbreviation: String,
    pub description: String,
    pub status: EntryStatus,
}

/// In-memory snapshot of the curated dictionary, keyed by abbreviation.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl Dictionary {
    /// Build from flat (abbreviation, description) pairs, deduplicating on
    /// the composite key.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (abb, desc) in pairs {
            let descs = entries.entry(abb).or_default();
            if !descs.contains(&desc) {
                descs.push(desc);
            }
        }
        Self { entries }
    }

    pub fn from_entries(items: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        Self::from_pairs(items.into_iter().flat_map(|entry| {
            let DictionaryEntry {
                abbreviation,
                descriptions,
            } = entry;
            descriptions
                .into_iter()
                .map(move |desc| (abbreviation.clone(), desc))
        }))
    }

    pub fn contains(&self, abbreviation: &str) -> bool {
        self.entries.contains_key(abbreviation)
    }

    pub fn descriptions_for(&self, abbreviation: &str) -> &[String] {
        self.entries
            .get(abbreviation)
            .map_or(&[], Vec::as_slice)
    }

    pub fn abbreviations(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = DictionaryEntry> + '_ {
        self.entries
            .iter()
            .map(|(abb, descs)| DictionaryEntry::new(abb.clone(), descs.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn latin_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]").unwrap())
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}-]+").unwrap())
}

/// Check that the description's word initials cover every letter of the
/// abbreviation. Hyphenated words contribute the initial of each part.
pub fn validate_abbreviation_match(abbreviation: &str, description: &str) -> bool {
    if abbreviation.is_empty() || description.is_empty() {
        return false;
    }

    let abb_letters: Vec<char> = abbreviation
        .to_uppercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();

    let mut initials: BTreeSet<char> = BTreeSet::new();
    for word in word_re().find_iter(description) {
        for part in word.as_str().split('-') {
            if let Some(first) = part.chars().next() {
                initials.extend(first.to_uppercase());
            }
        }
    }

    abb_letters.iter().all(|c| initials.contains(c))
}

/// Result of cleaning one entry's description against its abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanedDescription {
    /// Description kept (possibly reduced to its same-script half).
    Kept(String),
    /// The abbreviation itself mixes scripts; the entry needs validation
    /// instead of cleaning.
    MixedAbbreviation,
    /// No description half covers the abbreviation's letters.
    NoLetterMatch,
}

/// Reduce a bilingual description to the half matching the abbreviation's
/// script, then verify the word initials still spell the abbreviation.
///
/// Single-script abbreviations keep only the same-script description part
/// when that part is non-empty; otherwise the description passes through
/// unchanged and only the letter check applies.
pub fn clean_description_language(abbreviation: &str, description: &str) -> CleanedDescription {
    let (russian, latin) = script::split_by_language(description);

    let candidate = match script::classify(abbreviation) {
        Script::Mixed => return CleanedDescription::MixedAbbreviation,
        Script::Russian if !russian.is_empty() => russian,
        Script::Latin if !latin.is_empty() => latin,
        _ => description.to_string(),
    };

    if validate_abbreviation_match(abbreviation, &candidate) {
        CleanedDescription::Kept(candidate)
    } else {
        CleanedDescription::NoLetterMatch
    }
}

/// Normalize a set of (abbreviation, description) pairs: trim both fields,
/// format descriptions of Latin-lettered abbreviations to spell them out,
/// capitalize the first letter after leading digits, dedup on the composite
/// key and sort by it.
pub fn clean_and_sort(pairs: impl IntoIterator<Item = (String, String)>) -> Vec<(String, String)> {
    let mut seen = BTreeSet::new();
    for (abb, desc) in pairs {
        let abb = abb.trim().to_string();
        let mut desc = desc.trim().to_string();

        if latin_letter_re().is_match(&abb) {
            desc = format_description(&abb, &desc);
        }
        desc = capitalize_first_letter(&desc);

        seen.insert((abb, desc));
    }
    seen.into_iter().collect()
}

/// Normalize whole entries via [`clean_and_sort`], regrouping descriptions
/// per abbreviation. Output is sorted by abbreviation, descriptions sorted
/// and deduplicated within each entry.
pub fn normalize_entries(
    entries: impl IntoIterator<Item = DictionaryEntry>,
) -> Vec<DictionaryEntry> {
    let pairs = entries.into_iter().flat_map(|entry| {
        let DictionaryEntry {
            abbreviation,
            descriptions,
        } = entry;
        descriptions
            .into_iter()
            .map(move |desc| (abbreviation.clone(), desc))
    });

    let mut normalized: Vec<DictionaryEntry> = Vec::new();
    for (abb, desc) in clean_and_sort(pairs) {
        match normalized.last_mut() {
            Some(last) if last.abbreviation == abb => last.descriptions.push(desc),
            _ => normalized.push(DictionaryEntry::new(abb, vec![desc])),
        }
    }
    normalized
}

/// Counts of the two kinds of dictionary ambiguity worth showing a reviewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InconsistencySummary {
    /// Abbreviations with more than one unique description.
    pub multi_description_abbreviations: usize,
    /// Descriptions shared by more than one abbreviation.
    pub shared_descriptions: usize,
}

/// Summarize ambiguity in a flat entry list.
pub fn check_inconsistencies(entries: &[DictionaryEntry]) -> InconsistencySummary {
    let mut by_abb: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut by_desc: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entry in entries {
        for desc in &entry.descriptions {
            by_abb
                .entry(entry.abbreviation.as_str())
                .or_default()
                .insert(desc.as_str());
            by_desc
                .entry(desc.as_str())
                .or_default()
                .insert(entry.abbreviation.as_str());
        }
    }

    let summary = InconsistencySummary {
        multi_description_abbreviations: by_abb.values().filter(|d| d.len() > 1).count(),
        shared_descriptions: by_desc.values().filter(|a| a.len() > 1).count(),
    };
    if summary.multi_description_abbreviations > 0 {
        info!(
            count = summary.multi_description_abbreviations,
            "abbreviations with multiple descriptions"
        );
    }
    if summary.shared_descriptions > 0 {
        info!(
            count = summary.shared_descriptions,
            "descriptions shared by multiple abbreviations"
        );
    }
    summary
}
