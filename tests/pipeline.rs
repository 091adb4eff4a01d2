//! End-to-end pipeline tests over a synthetic in-memory document.
//!
//! These tests verify that:
//! 1. The document's own abbreviation table becomes the baseline
//! 2. Frequent candidates split into dictionary-matched and unmatched sets
//! 3. Homoglyph mistypes are corrected to the dictionary's spelling
//! 4. The reconciliation report diffs matched entries against the baseline
//!
//! Run with: cargo test --test pipeline

use abbrex::{
    Block, Dictionary, DictionaryEntry, Document, Paragraph, Pipeline, PipelineConfig, Table,
};

/// Opt-in log output: `RUST_LOG=debug cargo test --test pipeline -- --nocapture`.
fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// Known dictionary entries used across the tests.
const DICTIONARY_PAIRS: &[(&str, &str)] = &[
    ("ЭКГ", "Электрокардиограмма"),
    ("АД", "Артериальное давление"),
    ("BMI", "Body Mass Index"),
    ("vs", "versus"),
    ("С", "Цельсий"),
];

fn dictionary() -> Dictionary {
    Dictionary::from_pairs(
        DICTIONARY_PAIRS
            .iter()
            .map(|(a, d)| (a.to_string(), d.to_string())),
    )
}

fn abbreviation_table() -> Table {
    Table::new(vec![
        vec!["Аббревиатура".to_string(), "Расшифровка".to_string()],
        vec!["ЭКГ".to_string(), "Электрокардиограмма".to_string()],
        vec!["ОАК".to_string(), "Общий анализ крови".to_string()],
    ])
}

fn sample_document() -> Document {
    Document::new(vec![
        Block::Paragraph(Paragraph::heading("СПИСОК СОКРАЩЕНИЙ")),
        Block::Table(abbreviation_table()),
        Block::Paragraph(Paragraph::heading("ВВЕДЕНИЕ")),
        Block::Paragraph(Paragraph::new(
            "Пациентам выполнялась ЭКГ в покое. Повторная ЭКГ проводилась через неделю.",
        )),
        Block::Paragraph(Paragraph::new(
            "Индекс BMI рассчитывался дважды. Значение BMI фиксировалось в карте.",
        )),
        Block::Paragraph(Paragraph::new(
            "Оценка качества жизни проводилась по шкале КЖЗ. Показатель КЖЗ пересчитывался ежемесячно.",
        )),
        Block::Paragraph(Paragraph::new(
            "Контроль vs плацебо сравнивался на каждом визите.",
        )),
        Block::Paragraph(Paragraph::heading("СПИСОК ЛИТЕРАТУРЫ")),
        Block::Paragraph(Paragraph::new("1. РЕФС один. 2. РЕФС два.")),
    ])
}

#[test]
fn matched_and_unmatched_candidates_are_separated() {
    init_logging();
    let pipeline = Pipeline::default();
    let review = pipeline.process(&sample_document(), &dictionary()).unwrap();

    let matched: Vec<&str> = review
        .matched
        .iter()
        .map(|e| e.abbreviation.as_str())
        .collect();
    assert!(matched.contains(&"ЭКГ"));
    assert!(matched.contains(&"BMI"));

    let unmatched: Vec<&str> = review
        .unmatched
        .iter()
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(unmatched, vec!["КЖЗ"]);
    let kzh = &review.unmatched[0];
    assert_eq!(kzh.occurrence_count, 2);
    assert!(!kzh.contexts.is_empty());
    assert!(kzh.contexts[0].contains("КЖЗ"));
}

#[test]
fn bibliography_tokens_never_become_candidates() {
    let pipeline = Pipeline::default();
    let review = pipeline.process(&sample_document(), &dictionary()).unwrap();

    // РЕФС repeats twice inside the bibliography; segmentation must drop it
    // before detection ever sees it.
    assert!(review.unmatched.iter().all(|c| c.text != "РЕФС"));
}

#[test]
fn dictionary_sweep_recovers_lowercase_forms() {
    // "vs" has no uppercase letters, so candidate detection skips it; the
    // dictionary sweep still finds it in the text.
    let pipeline = Pipeline::default();
    let review = pipeline.process(&sample_document(), &dictionary()).unwrap();

    assert!(review.matched.iter().any(|e| e.abbreviation == "vs"));
}

#[test]
fn infrequent_candidates_are_not_surfaced() {
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Однократное упоминание ШОКР в тексте.",
    ))]);
    let pipeline = Pipeline::default();
    let review = pipeline.process(&doc, &dictionary()).unwrap();

    assert!(review.unmatched.is_empty());
}

#[test]
fn homoglyph_mistype_is_corrected_to_dictionary_form() {
    init_logging();
    // ЭКГ spelled with Latin K in both mentions.
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Выполнена ЭKГ в покое. Повторная ЭKГ не выявила отклонений.",
    ))]);
    let pipeline = Pipeline::default();
    let review = pipeline.process(&doc, &dictionary()).unwrap();

    assert!(review.matched.iter().any(|e| e.abbreviation == "ЭКГ"));
    assert!(review.unmatched.is_empty());

    let validation = review
        .validations
        .iter()
        .find(|v| v.original_form == "ЭKГ")
        .expect("correction recorded");
    assert_eq!(validation.correct_form.as_deref(), Some("ЭКГ"));
    assert_eq!(
        validation.descriptions,
        vec!["Электрокардиограмма".to_string()]
    );
}

#[test]
fn reconciliation_report_diffs_against_document_table() {
    let pipeline = Pipeline::default();
    let review = pipeline.process(&sample_document(), &dictionary()).unwrap();

    // ОАК sits in the document's table but never matched in the text.
    assert!(review
        .report
        .missing
        .iter()
        .any(|e| e.abbreviation == "ОАК"));
    // BMI matched in the text but is absent from the table.
    assert!(review
        .report
        .newly_found
        .iter()
        .any(|e| e.abbreviation == "BMI"));
    // ЭКГ appears on both sides, so it is reconciled.
    assert!(review.report.missing.iter().all(|e| e.abbreviation != "ЭКГ"));
    assert!(review
        .report
        .newly_found
        .iter()
        .all(|e| e.abbreviation != "ЭКГ"));
}

#[test]
fn one_letter_matches_are_held_for_approval() {
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Температура +38 С утром и 37 С вечером у пациентов группы АД. Контроль АД продолжен.",
    ))]);
    let pipeline = Pipeline::default();
    let review = pipeline.process(&doc, &dictionary()).unwrap();

    assert!(review.one_letter.iter().any(|e| e.abbreviation == "С"));
    assert!(review.matched.iter().all(|e| e.abbreviation != "С"));
    assert!(review.matched.iter().any(|e| e.abbreviation == "АД"));
}

#[test]
fn matched_descriptions_are_normalized() {
    let dict = Dictionary::from_pairs([("BMI".to_string(), "body mass index".to_string())]);
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Индекс BMI рассчитывался дважды. Значение BMI фиксировалось в карте.",
    ))]);
    let review = Pipeline::default().process(&doc, &dict).unwrap();

    let bmi = review
        .matched
        .iter()
        .find(|e| e.abbreviation == "BMI")
        .expect("BMI matched");
    assert_eq!(bmi.descriptions, vec!["Body Mass Index".to_string()]);
}

#[test]
fn baseline_table_descriptions_are_normalized() {
    let table = Table::new(vec![vec![
        "BMI".to_string(),
        "body mass index".to_string(),
    ]]);
    let doc = Document::new(vec![Block::Table(table)]);
    let review = Pipeline::default().process(&doc, &dictionary()).unwrap();

    assert!(review.report.missing.iter().any(|e| {
        e.abbreviation == "BMI" && e.descriptions == vec!["Body Mass Index".to_string()]
    }));
}

#[test]
fn suggestion_vetting_normalizes_and_defers_approval() {
    let pipeline = Pipeline::default();
    let dict = dictionary();

    let accepted = pipeline
        .vet_suggestion("ОРИТ", "отделение реанимации и интенсивной терапии", &dict)
        .unwrap()
        .expect("valid suggestion accepted");
    assert_eq!(accepted.abbreviation, "ОРИТ");
    assert_eq!(
        accepted.description,
        "Отделение реанимации и интенсивной терапии"
    );
    assert_eq!(accepted.status, abbrex::EntryStatus::ForReview);

    // The unavailability sentinel and non-spelling descriptions are refused.
    assert!(pipeline
        .vet_suggestion("ОРИТ", abbrex::suggest::UNAVAILABLE, &dict)
        .unwrap()
        .is_none());
    assert!(pipeline
        .vet_suggestion("ОРИТ", "случайная фраза", &dict)
        .unwrap()
        .is_none());
}

#[test]
fn conflicting_dictionary_surfaces_an_error() {
    let dict = Dictionary::from_entries([
        DictionaryEntry::new("ABC", vec!["latin entry".to_string()]),
        DictionaryEntry::new("АВС", vec!["cyrillic entry".to_string()]),
    ]);
    // Token mixing both scripts reaches both dictionary spellings.
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Платформа AВC тестировалась дважды. Система AВC прошла проверку.",
    ))]);
    let pipeline = Pipeline::default();

    assert!(pipeline.process(&doc, &dict).is_err());
}

#[test]
fn custom_config_overrides_frequency_gate() {
    let config = PipelineConfig {
        min_occurrences: 1,
        ..PipelineConfig::default()
    };
    let doc = Document::new(vec![Block::Paragraph(Paragraph::new(
        "Однократное упоминание ШОКР в тексте.",
    ))]);
    let review = Pipeline::new(config).process(&doc, &dictionary()).unwrap();

    assert!(review.unmatched.iter().any(|c| c.text == "ШОКР"));
}
