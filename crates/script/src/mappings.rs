//! Character mapping tables for Shahmukhi → Gurmukhi conversion.
//!
//! Shahmukhi is an abjad: consonants are reliable, vowels are contextual.
//! The tables split accordingly. Aspirate digraphs (consonant + do-chashmi
//! he) must be tried before single consonants.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Do-chashmi he, the aspiration carrier. Never emitted on its own.
pub const DO_CHASHMI_HE: char = '\u{06BE}';

/// Nasal noon ghunna, becomes a Gurmukhi nasal mark.
pub const NOON_GHUNNA: char = '\u{06BA}';

/// Consonant + do-chashmi he digraphs mapping to aspirated consonants.
pub static SHAHMUKHI_ASPIRATES: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    HashMap::from([
        ("بھ", 'ਭ'),
        ("پھ", 'ਫ'),
        ("تھ", 'ਥ'),
        ("ٹھ", 'ਠ'),
        ("جھ", 'ਝ'),
        ("چھ", 'ਛ'),
        ("دھ", 'ਧ'),
        ("ڈھ", 'ਢ'),
        ("کھ", 'ਖ'),
        ("گھ", 'ਘ'),
        ("ڑھ", 'ੜ'),
    ])
});

/// Single consonants. Arabic-origin letters collapse onto the closest
/// Punjabi consonant, nukta forms where Gurmukhi has them.
pub static SHAHMUKHI_CONSONANTS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('ب', "ਬ"),
        ('پ', "ਪ"),
        ('ت', "ਤ"),
        ('ٹ', "ਟ"),
        ('ث', "ਸ"),
        ('ج', "ਜ"),
        ('چ', "ਚ"),
        ('ح', "ਹ"),
        ('خ', "ਖ਼"),
        ('د', "ਦ"),
        ('ڈ', "ਡ"),
        ('ذ', "ਜ਼"),
        ('ر', "ਰ"),
        ('ڑ', "ੜ"),
        ('ز', "ਜ਼"),
        ('ژ', "ਜ਼"),
        ('س', "ਸ"),
        ('ش', "ਸ਼"),
        ('ص', "ਸ"),
        ('ض', "ਜ਼"),
        ('ط', "ਤ"),
        ('ظ', "ਜ਼"),
        ('غ', "ਗ਼"),
        ('ف', "ਫ਼"),
        ('ق', "ਕ"),
        ('ک', "ਕ"),
        ('گ', "ਗ"),
        ('ل', "ਲ"),
        ('م', "ਮ"),
        ('ن', "ਨ"),
        ('ہ', "ਹ"),
        ('ۃ', "ਹ"),
    ])
});

/// Context-dependent vowel letters: (word-initial form, medial/final form).
pub static SHAHMUKHI_VOWELS: Lazy<HashMap<char, (&'static str, &'static str)>> =
    Lazy::new(|| {
        HashMap::from([
            // Alif: independent a at word start, kanna medially.
            ('ا', ("ਅ", "ਾ")),
            ('أ', ("ਅ", "ਾ")),
            // Alif madda: long aa.
            ('آ', ("ਆ", "ਾ")),
            // Waw: consonant at start, hora medially.
            ('و', ("ਵ", "ੋ")),
            // Ye: consonant at start, bihari medially.
            ('ی', ("ਯ", "ੀ")),
            ('ئ', ("ਯ", "ੀ")),
            // Bari ye: e vowel.
            ('ے', ("ਏ", "ੇ")),
            ('ۓ', ("ਏ", "ੇ")),
        ])
    });

/// Short-vowel diacritics (zabar, zer, pesh, tanween). Zabar marks the
/// inherent vowel and therefore emits nothing.
pub static SHAHMUKHI_DIACRITICS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('\u{064E}', ""),        // zabar -> inherent a
        ('\u{0650}', "\u{0A3F}"), // zer -> sihari
        ('\u{064F}', "\u{0A41}"), // pesh -> aunkar
        ('\u{064B}', "\u{0A02}"), // tanween fathatan -> bindi
        ('\u{064D}', "\u{0A02}"), // tanween kasratan -> bindi
        ('\u{064C}', "\u{0A02}"), // tanween dammatan -> bindi
        ('\u{0652}', ""),        // sukun -> vowelless, nothing to add
    ])
});

/// Shadda doubles the consonant it sits on; rendered as adhak before it.
pub const SHADDA: char = '\u{0651}';

/// Letters that are silent in Punjabi and drop out of the conversion.
pub fn is_silent_shahmukhi(c: char) -> bool {
    matches!(c, 'ع' | 'ء' | '\u{0670}')
}

/// Frozen whole-word lexicon. Dictionary hits carry high confidence and
/// sidestep the vowel-inference rules entirely.
pub static SHAHMUKHI_LEXICON: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Religious vocabulary
        ("دھن", "ਧੰਨ"),
        ("گرو", "ਗੁਰੂ"),
        ("نانک", "ਨਾਨਕ"),
        ("دیو", "ਦੇਵ"),
        ("جی", "ਜੀ"),
        ("مہاراج", "ਮਹਾਰਾਜ"),
        ("واہگورو", "ਵਾਹਿਗੁਰੂ"),
        ("ستگرو", "ਸਤਿਗੁਰੂ"),
        ("گربانی", "ਗੁਰਬਾਣੀ"),
        ("بانی", "ਬਾਣੀ"),
        ("شبد", "ਸ਼ਬਦ"),
        ("صاحب", "ਸਾਹਿਬ"),
        ("خالصہ", "ਖ਼ਾਲਸਾ"),
        ("سری", "ਸ੍ਰੀ"),
        ("اکال", "ਅਕਾਲ"),
        ("ست", "ਸਤਿ"),
        ("رام", "ਰਾਮ"),
        ("ہری", "ਹਰੀ"),
        ("سنگت", "ਸੰਗਤ"),
        ("سیوا", "ਸੇਵਾ"),
        ("سمرن", "ਸਿਮਰਨ"),
        ("کیرتن", "ਕੀਰਤਨ"),
        ("کتھا", "ਕਥਾ"),
        // Function words
        ("ہے", "ਹੈ"),
        ("ہیں", "ਹਨ"),
        ("نے", "ਨੇ"),
        ("کو", "ਕੋ"),
        ("سے", "ਸੇ"),
        ("میں", "ਮੇਂ"),
        ("کا", "ਕਾ"),
        ("کی", "ਕੀ"),
        ("کے", "ਕੇ"),
        ("دے", "ਦੇ"),
        ("دا", "ਦਾ"),
        ("دی", "ਦੀ"),
        ("اندر", "ਅੰਦਰ"),
        ("تے", "ਤੇ"),
        ("وچ", "ਵਿਚ"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspirates_cover_common_digraphs() {
        assert_eq!(SHAHMUKHI_ASPIRATES.get("دھ"), Some(&'ਧ'));
        assert_eq!(SHAHMUKHI_ASPIRATES.get("بھ"), Some(&'ਭ'));
    }

    #[test]
    fn test_lexicon_has_core_vocabulary() {
        assert_eq!(SHAHMUKHI_LEXICON.get("دھن"), Some(&"ਧੰਨ"));
        assert_eq!(SHAHMUKHI_LEXICON.get("گرو"), Some(&"ਗੁਰੂ"));
        assert_eq!(SHAHMUKHI_LEXICON.get("نانک"), Some(&"ਨਾਨਕ"));
    }

    #[test]
    fn test_consonant_table_uses_nukta_forms() {
        assert_eq!(SHAHMUKHI_CONSONANTS.get(&'ش'), Some(&"ਸ਼"));
        assert_eq!(SHAHMUKHI_CONSONANTS.get(&'ف'), Some(&"ਫ਼"));
        assert_eq!(SHAHMUKHI_CONSONANTS.get(&'خ'), Some(&"ਖ਼"));
    }
}
