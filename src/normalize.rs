//! Title normalization.
//!
//! Produces the romanized, space-free romanized and translated forms of a chart
//! title. Titles written in Japanese scripts go through the translation
//! collaborator; anything else is already Latin-compatible and is used as is.

use any_ascii::any_ascii;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::config::translation;
use crate::error::Result;
use crate::models::NormalizedTitle;
use crate::translate::Translator;

// ============================================================================
// SCRIPT DETECTION
// ============================================================================

/// Check if a character belongs to the scripts chart titles are written in:
/// CJK punctuation, hiragana, katakana, half/full-width forms, CJK ideographs,
/// stars, arrows and the reference mark.
pub fn is_japanese_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0xFF00..=0xFFEF
        | 0x4E00..=0x9FAF
        | 0x2605..=0x2606
        | 0x2190..=0x2195
        | 0x203B)
}

pub fn contains_japanese(s: &str) -> bool {
    s.chars().any(is_japanese_char)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold a pronunciation guide to plain ASCII, keeping case.
/// e.g., "Kōrī no Hana" → "Kori no Hana"
pub fn fold_to_ascii(s: &str) -> String {
    // Strip macrons and other guide marks via NFKD decomposition
    let stripped: String = s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    // Then transliterate anything left (kana the guide kept, symbols)
    any_ascii(&stripped)
}

/// Remove every space character (U+0020 only).
pub fn strip_spaces(s: &str) -> String {
    s.replace(' ', "")
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize a decoded title.
///
/// Translation errors propagate; a missing pronunciation is treated like a
/// title without Japanese characters.
pub fn normalize_title<T: Translator + ?Sized>(title: &str, translator: &T) -> Result<NormalizedTitle> {
    let (romanized, translated) = if contains_japanese(title) {
        let translated = translator.translate(
            title,
            translation::SOURCE_LANG,
            translation::TARGET_LANG,
        )?;
        match translator.pronounce(title, translation::SOURCE_LANG)? {
            Some(pronunciation) => (fold_to_ascii(&pronunciation), translated),
            None => {
                debug!("no pronunciation for {:?}, keeping original", title);
                (title.to_string(), title.to_string())
            }
        }
    } else {
        (title.to_string(), title.to_string())
    };

    Ok(NormalizedTitle {
        romanized_no_space: strip_spaces(&romanized),
        romanized,
        translated,
    })
}

// ============================================================================
// TESTS
// ============================================================================
