//! Gurmukhi diacritic normalization.
//!
//! Rules:
//! 1. Unicode normalization to the configured form (NFC by default).
//! 2. Tippi (ੰ) before consonants, bindi (ਂ) before vowel signs.
//! 3. Combining marks after a base ordered canonically:
//!    base → nukta → vowel sign → nasalization → adhak.
//! 4. Stacked identical marks deduplicated.
//!
//! The transform is idempotent: normalize(normalize(x)) == normalize(x).

use unicode_normalization::UnicodeNormalization;

use crate::chars::{
    is_consonant, is_independent_vowel, is_nasal_mark, is_vowel_sign, ADHAK, BINDI, NUKTA, TIPPI,
    VIRAMA,
};
use crate::ScriptError;

/// Unicode normalization form selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl UnicodeForm {
    pub fn parse(value: &str) -> Result<Self, ScriptError> {
        match value.to_ascii_uppercase().as_str() {
            "NFC" => Ok(UnicodeForm::Nfc),
            "NFD" => Ok(UnicodeForm::Nfd),
            "NFKC" => Ok(UnicodeForm::Nfkc),
            "NFKD" => Ok(UnicodeForm::Nfkd),
            other => Err(ScriptError::UnsupportedUnicodeForm(other.to_string())),
        }
    }

    fn apply(&self, text: &str) -> String {
        match self {
            UnicodeForm::Nfc => text.nfc().collect(),
            UnicodeForm::Nfd => text.nfd().collect(),
            UnicodeForm::Nfkc => text.nfkc().collect(),
            UnicodeForm::Nfkd => text.nfkd().collect(),
        }
    }
}

/// Normalizes Gurmukhi diacritics.
#[derive(Debug, Clone)]
pub struct GurmukhiNormalizer {
    form: UnicodeForm,
}

impl GurmukhiNormalizer {
    pub fn new(form: UnicodeForm) -> Self {
        Self { form }
    }

    pub fn from_form_name(name: &str) -> Result<Self, ScriptError> {
        Ok(Self::new(UnicodeForm::parse(name)?))
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let unicode_normalized = self.form.apply(text);
        let ordered = order_and_dedup_marks(&unicode_normalized);
        normalize_nasalization(&ordered)
    }
}

impl Default for GurmukhiNormalizer {
    fn default() -> Self {
        Self::new(UnicodeForm::Nfc)
    }
}

/// Vowel signs whose nasalization is written with bindi. The short-vowel
/// signs (sihari, aunkar, dulankar) and bare consonants take tippi.
fn takes_bindi(c: char) -> bool {
    matches!(c, '\u{0A3E}' | '\u{0A40}' | '\u{0A47}' | '\u{0A48}' | '\u{0A4B}' | '\u{0A4C}')
        || is_independent_vowel(c)
}

/// Choose tippi vs bindi from the codepoint the mark attaches to (runs
/// after reordering, so the attachment point is the previous codepoint).
/// A following independent vowel also forces bindi.
fn normalize_nasalization(text: &str) -> String {
    if !text.contains(TIPPI) && !text.contains(BINDI) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if !is_nasal_mark(c) {
            out.push(c);
            continue;
        }

        let next_is_vowel = chars
            .get(i + 1)
            .is_some_and(|&next| is_independent_vowel(next));
        let attached_long = i > 0 && takes_bindi(chars[i - 1]);
        let attached_short =
            i > 0 && (is_consonant(chars[i - 1]) || is_vowel_sign(chars[i - 1]));

        if next_is_vowel || attached_long {
            out.push(BINDI);
        } else if attached_short {
            out.push(TIPPI);
        } else {
            // Stray mark with no usable context keeps its identity.
            out.push(c);
        }
    }

    out
}

/// Canonical rank of a combining mark within its cluster.
fn mark_rank(c: char) -> Option<u8> {
    if c == NUKTA {
        Some(0)
    } else if c == VIRAMA {
        Some(1)
    } else if is_vowel_sign(c) {
        Some(2)
    } else if is_nasal_mark(c) {
        Some(3)
    } else if c == ADHAK {
        Some(4)
    } else {
        None
    }
}

/// Reorder each run of combining marks to the canonical order and drop
/// stacked duplicates. The sort is stable, so equal-rank marks keep their
/// relative order.
fn order_and_dedup_marks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cluster: Vec<char> = Vec::new();

    let flush = |cluster: &mut Vec<char>, out: &mut String| {
        cluster.sort_by_key(|&c| mark_rank(c).unwrap_or(u8::MAX));
        cluster.dedup();
        for c in cluster.drain(..) {
            out.push(c);
        }
    };

    for c in text.chars() {
        if mark_rank(c).is_some() {
            cluster.push(c);
        } else {
            flush(&mut cluster, &mut out);
            out.push(c);
        }
    }
    flush(&mut cluster, &mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent() {
        let normalizer = GurmukhiNormalizer::default();
        let input = "ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ";
        let once = normalizer.normalize(input);
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tippi_before_consonant() {
        let normalizer = GurmukhiNormalizer::default();
        // Bindi written where tippi belongs (before ਨ).
        let input = "ਧ\u{0A02}ਨ";
        assert_eq!(normalizer.normalize(input), "ਧ\u{0A70}ਨ");
    }

    #[test]
    fn test_bindi_after_long_vowel() {
        let normalizer = GurmukhiNormalizer::default();
        // Tippi written where bindi belongs (after kanna, as in ਮਾਂ).
        let input = "ਮਾ\u{0A70}";
        let out = normalizer.normalize(input);
        assert!(out.ends_with('\u{0A02}'), "got {out:?}");
    }

    #[test]
    fn test_mark_reordering() {
        let normalizer = GurmukhiNormalizer::default();
        // Nasal written before the vowel sign; canonical order is vowel
        // sign first.
        let input = "ਕ\u{0A70}\u{0A41}";
        let out = normalizer.normalize(input);
        let chars: Vec<char> = out.chars().collect();
        assert_eq!(chars, vec!['ਕ', '\u{0A41}', '\u{0A70}']);
    }

    #[test]
    fn test_duplicate_marks_collapse() {
        let normalizer = GurmukhiNormalizer::default();
        let input = "ਕ\u{0A41}\u{0A41}";
        let out = normalizer.normalize(input);
        assert_eq!(out.chars().filter(|&c| c == '\u{0A41}').count(), 1);
    }

    #[test]
    fn test_word_final_nasal_becomes_tippi() {
        let normalizer = GurmukhiNormalizer::default();
        let out = normalizer.normalize("ਤੂ\u{0A02}");
        assert!(out.ends_with('\u{0A70}'), "got {out:?}");
    }

    #[test]
    fn test_empty_passthrough() {
        let normalizer = GurmukhiNormalizer::default();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("  "), "  ");
    }

    #[test]
    fn test_form_parse() {
        assert!(UnicodeForm::parse("nfc").is_ok());
        assert!(UnicodeForm::parse("NFKD").is_ok());
        assert!(UnicodeForm::parse("NFX").is_err());
    }
}
