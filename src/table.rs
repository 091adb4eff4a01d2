//! Extraction of an existing abbreviation table from the document body.

use crate::dictionary::DictionaryEntry;
use crate::document::{Block, Document, Paragraph, Table};
use serde::Serialize;
use tracing::{info, warn};

/// Parsed abbreviation table plus a row-level skip summary.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOutcome {
    pub entries: Vec<DictionaryEntry>,
    /// Rows dropped for not being two-column (abbreviation, description).
    pub skipped_rows: usize,
}

/// Literal header labels of the standard table; a first row equal to these
/// is a header, not data.
pub const HEADER_LABELS: [&str; 2] = ["Аббревиатура", "Расшифровка"];

fn is_section_heading(para: &Paragraph, section_patterns: &[String]) -> bool {
    let text = para.text.trim();
    let lowered = text.to_lowercase();
    if !section_patterns
        .iter()
        .any(|p| lowered.contains(&p.to_lowercase()))
    {
        return false;
    }
    // A ToC entry for the real section ends in a page number or carries a
    // hyperlink; a genuine section title does neither.
    if text.ends_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    if para.hyperlink {
        return false;
    }
    para.heading
}

/// Locate the abbreviation table: the first table after a paragraph whose
/// text contains one of `section_patterns`. A document whose body holds
/// exactly one table uses that table directly, no heading required.
fn find_table<'a>(document: &'a Document, section_patterns: &[String]) -> Option<&'a Table> {
    let mut tables = document.tables();
    if let (Some(only), None) = (tables.next(), tables.next()) {
        return Some(only);
    }

    let mut found_section = false;
    for block in &document.blocks {
        match block {
            Block::Paragraph(para) => {
                if is_section_heading(para, section_patterns) {
                    found_section = true;
                }
            }
            Block::Table(table) if found_section => return Some(table),
            Block::Table(_) => {}
        }
    }
    None
}

/// Parse the document's abbreviation table into entries.
///
/// Rows with other than two columns are skipped and counted, not fatal.
/// Duplicate abbreviations merge their descriptions, and the result is
/// normalized like any entry set: formatted descriptions, deduped, sorted
/// by abbreviation. An absent table yields an empty outcome, not an error.
pub fn extract_abbreviation_table(
    document: &Document,
    section_patterns: &[String],
) -> TableOutcome {
    let Some(table) = find_table(document, section_patterns) else {
        info!("no abbreviation table found in document");
        return TableOutcome::default();
    };

    let mut entries: Vec<DictionaryEntry> = Vec::new();
    let mut skipped_rows = 0;

    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<&str> = row.iter().map(|c| c.trim()).collect();

        if i == 0 && cells == HEADER_LABELS {
            continue;
        }
        let [abbreviation, description] = cells.as_slice() else {
            warn!(row = i, columns = cells.len(), "skipping non-two-column table row");
            skipped_rows += 1;
            continue;
        };
        if abbreviation.is_empty() {
            warn!(row = i, "skipping table row with empty abbreviation");
            skipped_rows += 1;
            continue;
        }

        match entries.iter_mut().find(|e| e.abbreviation == *abbreviation) {
            Some(entry) => {
                if !entry.descriptions.iter().any(|d| d == description) {
                    entry.descriptions.push(description.to_string());
                }
            }
            None => entries.push(DictionaryEntry::new(
                abbreviation.to_string(),
                vec![description.to_string()],
            )),
        }
    }

    TableOutcome {
        entries: crate::dictionary::normalize_entries(entries),
        skipped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Paragraph, Table};

    fn patterns() -> Vec<String> {
        vec![
            "ПЕРЕЧЕНЬ СОКРАЩЕНИЙ И ОПРЕДЕЛЕНИЯ ТЕРМИНОВ".to_string(),
            "СПИСОК СОКРАЩЕНИЙ".to_string(),
        ]
    }

    fn abb_table() -> Table {
        Table::new(vec![
            vec!["Аббревиатура".to_string(), "Расшифровка".to_string()],
            vec!["ЭКГ".to_string(), "Электрокардиограмма".to_string()],
            vec!["BMI".to_string(), "Body Mass Index".to_string()],
        ])
    }

    #[test]
    fn extracts_table_after_matching_heading() {
        let doc = Document::new(vec![
            Block::Paragraph(Paragraph::new("Введение.")),
            Block::Table(Table::new(vec![vec!["не та".to_string(), "таблица".to_string()]])),
            Block::Paragraph(Paragraph::heading("СПИСОК СОКРАЩЕНИЙ")),
            Block::Table(abb_table()),
        ]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        let abbs: Vec<&str> = outcome
            .entries
            .iter()
            .map(|e| e.abbreviation.as_str())
            .collect();
        assert_eq!(abbs, vec!["BMI", "ЭКГ"]);
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn single_table_document_needs_no_heading() {
        let doc = Document::new(vec![Block::Table(abb_table())]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert_eq!(outcome.entries.len(), 2);
    }

    #[test]
    fn toc_lines_do_not_count_as_headings() {
        let mut toc_link = Paragraph::heading("СПИСОК СОКРАЩЕНИЙ");
        toc_link.hyperlink = true;
        let doc = Document::new(vec![
            Block::Paragraph(toc_link),
            Block::Paragraph(Paragraph::heading("СПИСОК СОКРАЩЕНИЙ 5")),
            Block::Paragraph(Paragraph::new("СПИСОК СОКРАЩЕНИЙ")),
            Block::Table(abb_table()),
            Block::Table(abb_table()),
        ]);
        // Two tables, so the single-table shortcut does not apply; none of
        // the candidate paragraphs qualifies as a heading.
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() {
        let table = Table::new(vec![
            vec!["ЭКГ".to_string(), "Электрокардиограмма".to_string()],
            vec!["одна ячейка".to_string()],
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        ]);
        let doc = Document::new(vec![Block::Table(table)]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.skipped_rows, 2);
    }

    #[test]
    fn duplicate_abbreviations_merge_descriptions() {
        let table = Table::new(vec![
            vec!["ЭКГ".to_string(), "Электрокардиограмма".to_string()],
            vec!["ЭКГ".to_string(), "Электрокардиография".to_string()],
            vec!["ЭКГ".to_string(), "Электрокардиограмма".to_string()],
        ]);
        let doc = Document::new(vec![Block::Table(table)]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(
            outcome.entries[0].descriptions,
            vec![
                "Электрокардиограмма".to_string(),
                "Электрокардиография".to_string(),
            ]
        );
    }

    #[test]
    fn parsed_descriptions_are_normalized() {
        let table = Table::new(vec![vec![
            "BMI".to_string(),
            " body mass index ".to_string(),
        ]]);
        let doc = Document::new(vec![Block::Table(table)]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert_eq!(
            outcome.entries[0].descriptions,
            vec!["Body Mass Index".to_string()]
        );
    }

    #[test]
    fn missing_table_is_empty_not_error() {
        let doc = Document::new(vec![Block::Paragraph(Paragraph::new("Текст."))]);
        let outcome = extract_abbreviation_table(&doc, &patterns());
        assert!(outcome.entries.is_empty());
    }
}
