//! Description formatting: capitalizes the words of a Latin expansion so
//! they spell out the abbreviation, e.g. `BMI` + "body mass index" becomes
//! "Body Mass Index".

use regex::Regex;
use std::sync::OnceLock;

/// Latin transliteration for Greek letters that appear in abbreviations
/// like `TNF-α`.
fn greek_to_latin(ch: char) -> Option<&'static str> {
    Some(match ch {
        'α' => "A",
        'β' => "B",
        'γ' => "G",
        'δ' => "D",
        'ε' => "E",
        'ζ' => "Z",
        'η' => "H",
        'θ' => "TH",
        'ι' => "I",
        'κ' => "K",
        'λ' => "L",
        'μ' => "M",
        'ν' => "N",
        'ξ' => "X",
        'ο' => "O",
        'π' => "P",
        'ρ' => "R",
        'σ' => "S",
        'τ' => "T",
        'υ' => "U",
        'φ' => "PH",
        'χ' => "CH",
        'ψ' => "PS",
        'ω' => "O",
        _ => return None,
    })
}

/// Uppercase Latin letter sequence of an abbreviation, Greek letters
/// transliterated first. Digits, hyphens and Cyrillic letters drop out.
fn abbreviation_letters(abbreviation: &str) -> Vec<char> {
    let mut expanded = String::new();
    for ch in abbreviation.chars() {
        match greek_to_latin(ch) {
            Some(lat) => expanded.push_str(lat),
            None => expanded.extend(ch.to_uppercase()),
        }
    }
    expanded.chars().filter(|c| c.is_ascii_uppercase()).collect()
}

/// Capitalize, left to right, each word start whose letter matches the next
/// letter of the abbreviation. A match must sit at a word start (preceded by
/// a non-letter) so letters inside words are never consumed.
fn capitalize_by_abbreviation(desc: &str, letters: &[char]) -> String {
    let mut chars: Vec<char> = desc.chars().collect();
    let mut abbr_idx = 0;
    for pos in 0..chars.len() {
        if abbr_idx >= letters.len() {
            break;
        }
        let at_word_start = pos == 0 || !chars[pos - 1].is_alphabetic();
        if at_word_start
            && chars[pos].to_uppercase().next() == Some(letters[abbr_idx])
        {
            if let Some(upper) = chars[pos].to_uppercase().next() {
                chars[pos] = upper;
            }
            abbr_idx += 1;
        }
    }
    chars.into_iter().collect()
}

/// Format a description against its abbreviation.
///
/// Only the part before the first `(` is reworked: it is lowercased and then
/// recapitalized to spell the abbreviation. Anything from the `(` on (the
/// typical parenthesized Russian translation) is kept verbatim.
pub fn format_description(abbreviation: &str, description: &str) -> String {
    let (primary, secondary) = match description.split_once('(') {
        Some((head, tail)) => (head.trim().to_lowercase(), Some(format!("({tail}"))),
        None => (description.trim().to_lowercase(), None),
    };

    let letters = abbreviation_letters(abbreviation);
    let capitalized = capitalize_by_abbreviation(&primary, &letters);

    match secondary {
        Some(tail) => format!("{capitalized} {tail}").trim().to_string(),
        None => capitalized.trim().to_string(),
    }
}

fn leading_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d*)([a-zA-ZА-Яа-яЁё])").unwrap())
}

/// Uppercase the first letter of a description, skipping any leading digits
/// ("12-недельный" stays, "электрокардиограмма" gets its Э capitalized).
pub fn capitalize_first_letter(description: &str) -> String {
    leading_letter_re()
        .replace(description, |caps: &regex::Captures| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned()
}
