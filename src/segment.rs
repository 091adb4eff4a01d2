//! Relevant-text segmentation: walks the paragraph stream and drops
//! bibliography-like sections delimited by heading/bold markers.

use crate::document::Paragraph;
use tracing::debug;

/// Extract the document's relevant text, excluding sections whose heading
/// (or fully bold paragraph) contains one of `skip_titles`.
///
/// Two-state machine: a matching heading enters the skip state, the next
/// heading leaves it (and is itself emitted as the resuming section header).
/// Ordinary paragraphs never change state. If no closing heading follows, the
/// skip state persists to the end of the document; an unterminated skip
/// section is assumed to be a trailing bibliography.
pub fn extract_relevant_text(
    paragraphs: impl IntoIterator<Item = Paragraph>,
    skip_titles: &[String],
) -> String {
    let mut relevant: Vec<String> = Vec::new();
    let mut skipping = false;

    for para in paragraphs {
        let text = para.text.trim();
        let is_marker = para.heading || para.bold;
        let matches_title = {
            let upper = text.to_uppercase();
            skip_titles.iter().any(|t| upper.contains(&t.to_uppercase()))
        };

        if is_marker && matches_title && !skipping {
            debug!(title = %text, "entering skip section");
            skipping = true;
        } else if is_marker && skipping {
            debug!(title = %text, "resuming at section");
            skipping = false;
        }

        if !skipping && !text.is_empty() {
            relevant.push(text.to_string());
        }
    }

    relevant.join(" ")
}
