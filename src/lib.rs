//! Extraction and reconciliation of abbreviation dictionaries from
//! bilingual (Cyrillic/Latin) technical documents.
//!
//! The pipeline takes a pre-parsed document and a curated dictionary
//! snapshot, finds abbreviation-shaped tokens in the relevant text, matches
//! them against the dictionary (including homoglyph-mistyped forms), and
//! reports the set difference against the document's own abbreviation table.
//! Everything is synchronous and deterministic; the only I/O lives behind
//! the [`suggest::DescriptionSuggester`] boundary.

pub mod detect;
pub mod dictionary;
pub mod document;
pub mod format;
pub mod homoglyph;
pub mod reconcile;
pub mod script;
pub mod segment;
pub mod suggest;
pub mod table;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

pub use detect::AbbreviationCandidate;
pub use dictionary::{AppendRequest, Dictionary, DictionaryEntry, EntryStatus};
pub use document::{Block, Document, Paragraph, Table};
pub use homoglyph::{HomoglyphMap, ValidationError, ValidationResult};
pub use reconcile::ReconciliationReport;

/// Term sets and thresholds for one document convention. Defaults target
/// Russian clinical study documents; every field is explicit so alternative
/// conventions can coexist.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Section titles whose content is dropped during segmentation.
    pub skip_sections: Vec<String>,
    /// Headings that introduce the document's own abbreviation table.
    pub section_patterns: Vec<String>,
    /// Capitalized ordinary words that must never become candidates.
    pub exclude_terms: HashSet<String>,
    /// Characters of context kept on each side of an occurrence.
    pub context_window: usize,
    /// Cap on distinct context snippets per candidate; `None` keeps all.
    pub max_contexts: Option<usize>,
    /// Candidates occurring fewer times than this are not surfaced.
    pub min_occurrences: usize,
    /// Description similarity threshold on a 0-100 scale.
    pub similarity_threshold: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_sections: [
                "СПИСОК ЛИТЕРАТУРЫ",
                "Список использованной литературы",
                "Список использованных источников",
            ]
            .map(String::from)
            .to_vec(),
            section_patterns: [
                "ПЕРЕЧЕНЬ СОКРАЩЕНИЙ И ОПРЕДЕЛЕНИЯ ТЕРМИНОВ",
                "СПИСОК СОКРАЩЕНИЙ",
            ]
            .map(String::from)
            .to_vec(),
            exclude_terms: [
                "ДИЗАЙН",
                "ГЛАВНЫЙ",
                "СПИСОК",
                "ПРЯМОЙ",
                "ПРИЕМ",
                "ПРОТОКОЛ",
                "ОТБОР",
                "КАЧЕСТВА",
                "ПЕРИОД",
                "ВЕДЕНИЕ",
                "ЭТАП",
                "ЭТИКА",
                "СИНОПСИС",
                "ЛИСТ",
                "ЦЕЛИ",
                "РАБОТА",
                "ИСТОРИЯ",
                "ОЦЕНКА",
                "СПОНСОР",
                "ЗАДАЧИ",
                "ДОСТУП",
                "КОНТРОЛЬ",
                "ТЕРМИНОВ",
                "ЗАПИСЕЙ",
                "ГИПОТЕЗА",
                "ДАННЫМИ",
                "ДАННЫМ/ДОКУМЕНТАЦИИ",
            ]
            .map(String::from)
            .into(),
            context_window: 50,
            max_contexts: None,
            min_occurrences: 2,
            similarity_threshold: 75,
        }
    }
}

/// Everything a reviewer needs after one document run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReview {
    /// Candidates resolved against the dictionary, with descriptions.
    pub matched: Vec<DictionaryEntry>,
    /// One-letter dictionary matches, held out for explicit approval.
    pub one_letter: Vec<DictionaryEntry>,
    /// Frequent candidates the dictionary does not know, with contexts.
    pub unmatched: Vec<AbbreviationCandidate>,
    /// Homoglyph findings: corrections applied and ambiguous tokens.
    pub validations: Vec<ValidationResult>,
    /// Diff of `matched` against the document's own abbreviation table.
    pub report: ReconciliationReport,
    pub inconsistencies: dictionary::InconsistencySummary,
    /// Rows of the document's table dropped as malformed.
    pub skipped_table_rows: usize,
}

/// One extraction-and-reconciliation run over in-memory documents.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    homoglyphs: HomoglyphMap,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            homoglyphs: HomoglyphMap::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over one document.
    ///
    /// Fails only on [`ValidationError::DictionaryConflict`], which signals
    /// a corrupt dictionary rather than a recoverable document problem.
    pub fn process(
        &self,
        document: &Document,
        dictionary: &Dictionary,
    ) -> Result<DocumentReview, ValidationError> {
        let baseline = table::extract_abbreviation_table(document, &self.config.section_patterns);

        let text = segment::extract_relevant_text(
            document.paragraphs().cloned(),
            &self.config.skip_sections,
        );
        let counts = detect::extract_candidates(&text, &self.config.exclude_terms);
        debug!(candidates = counts.len(), "detected candidate tokens");

        let frequent: BTreeMap<&String, usize> = counts
            .iter()
            .filter(|(_, &count)| count >= self.config.min_occurrences)
            .map(|(token, &count)| (token, count))
            .collect();

        let mut matched: Vec<DictionaryEntry> = Vec::new();
        for token in frequent.keys() {
            if dictionary.contains(token) {
                matched.push(DictionaryEntry::new(
                    (*token).clone(),
                    dictionary.descriptions_for(token).to_vec(),
                ));
            }
        }

        // Sweep the dictionary for known abbreviations the case heuristic
        // missed entirely (e.g. lowercase dictionary forms).
        for abb in dictionary.abbreviations() {
            if !counts.contains_key(abb) && detect::contains_whole_token(&text, abb) {
                debug!(abbreviation = %abb, "dictionary sweep recovered abbreviation");
                matched.push(DictionaryEntry::new(
                    abb.clone(),
                    dictionary.descriptions_for(abb).to_vec(),
                ));
            }
        }

        let mut unmatched: Vec<AbbreviationCandidate> = frequent
            .iter()
            .filter(|(token, _)| !dictionary.contains(token))
            .map(|(token, &count)| AbbreviationCandidate {
                text: (*token).clone(),
                occurrence_count: count,
                contexts: detect::find_contexts(
                    &text,
                    token,
                    self.config.context_window,
                    self.config.max_contexts,
                ),
            })
            .collect();

        // Homoglyph pass: a corrected candidate moves into the matched set
        // under its canonical spelling; ambiguous ones stay unmatched.
        let mut validations: Vec<ValidationResult> = Vec::new();
        let mut corrected: HashSet<String> = HashSet::new();
        for candidate in &unmatched {
            if let Some(result) =
                homoglyph::validate(&candidate.text, dictionary, &self.homoglyphs)?
            {
                if let Some(correct) = &result.correct_form {
                    info!(original = %candidate.text, correct = %correct, "homoglyph correction");
                    if !matched.iter().any(|e| &e.abbreviation == correct) {
                        matched.push(DictionaryEntry::new(
                            correct.clone(),
                            result.descriptions.clone(),
                        ));
                    }
                    corrected.insert(candidate.text.clone());
                }
                validations.push(result);
            }
        }
        unmatched.retain(|c| !corrected.contains(&c.text));

        // Matched entries get the same normalization as table entries:
        // formatted descriptions, deduped, sorted by abbreviation.
        let matched = dictionary::normalize_entries(matched);

        // One-letter matches need explicit human approval before they join
        // the output table.
        let (one_letter, matched): (Vec<_>, Vec<_>) = matched
            .into_iter()
            .partition(|e| e.abbreviation.chars().count() == 1);

        let report = reconcile::diff(&baseline.entries, &matched);
        let inconsistencies = dictionary::check_inconsistencies(&matched);

        Ok(DocumentReview {
            matched,
            one_letter,
            unmatched,
            validations,
            report,
            inconsistencies,
            skipped_table_rows: baseline.skipped_rows,
        })
    }

    /// Group near-duplicate descriptions for one abbreviation, using the
    /// configured similarity threshold. First occurrence wins as canonical.
    pub fn cluster_descriptions(
        &self,
        descriptions: &[String],
    ) -> (Vec<String>, BTreeMap<String, String>) {
        reconcile::cluster_descriptions(descriptions, self.config.similarity_threshold)
    }

    /// Vet a suggested description before it may become an append request.
    ///
    /// The sentinel for an unavailable suggestion and descriptions whose
    /// word initials do not spell the abbreviation are rejected. Accepted
    /// descriptions are normalized the same way table entries are, and the
    /// request is emitted as `for_review`, never pre-approved.
    pub fn vet_suggestion(
        &self,
        abbreviation: &str,
        description: &str,
        dictionary: &Dictionary,
    ) -> Result<Option<AppendRequest>, ValidationError> {
        if description.trim().is_empty() || description == suggest::UNAVAILABLE {
            return Ok(None);
        }
        // A mistyped abbreviation must be corrected before its description
        // is considered at all.
        if homoglyph::validate(abbreviation, dictionary, &self.homoglyphs)?.is_some() {
            return Ok(None);
        }

        let cleaned = match dictionary::clean_description_language(abbreviation, description) {
            dictionary::CleanedDescription::Kept(desc) => desc,
            dictionary::CleanedDescription::MixedAbbreviation
            | dictionary::CleanedDescription::NoLetterMatch => return Ok(None),
        };

        let normalized = dictionary::clean_and_sort([(abbreviation.to_string(), cleaned)])
            .into_iter()
            .next();
        Ok(normalized.map(|(abbreviation, description)| AppendRequest {
            abbreviation,
            description,
            status: EntryStatus::ForReview,
        }))
    }
}
