//! Shahmukhi → Gurmukhi conversion.
//!
//! Two layers: a frozen whole-word lexicon, then per-character rules with
//! contextual vowel inference. The RTL source is consumed in reading order
//! (the string iterates in logical order already); the Gurmukhi result is
//! written LTR.

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::chars::{ADHAK, BINDI};
use crate::mappings::{
    is_silent_shahmukhi, DO_CHASHMI_HE, NOON_GHUNNA, SHADDA, SHAHMUKHI_ASPIRATES,
    SHAHMUKHI_CONSONANTS, SHAHMUKHI_DIACRITICS, SHAHMUKHI_LEXICON, SHAHMUKHI_VOWELS,
};

/// Per-word confidences by how the word resolved.
const CONF_LEXICON: f32 = 0.95;
const CONF_CONSONANT: f32 = 0.9;
const CONF_VOWEL: f32 = 0.85;
const CONF_DIACRITIC: f32 = 0.8;
const CONF_UNKNOWN: f32 = 0.5;

/// Converts Shahmukhi text to Gurmukhi.
#[derive(Debug, Clone)]
pub struct ShahmukhiConverter {
    use_lexicon: bool,
}

impl ShahmukhiConverter {
    pub fn new(use_lexicon: bool) -> Self {
        Self { use_lexicon }
    }

    /// Convert a whole text. Returns the Gurmukhi rendition and the mean
    /// per-word confidence (lexicon hits high, rule fallback lower).
    pub fn convert(&self, text: &str) -> (String, f32) {
        if text.trim().is_empty() {
            return (String::new(), 1.0);
        }

        let text: String = text.nfc().collect();
        let mut converted = Vec::new();
        let mut confidence_sum = 0.0f32;
        let mut word_count = 0usize;

        for word in text.split_whitespace() {
            let (out, confidence) = self.convert_word(word);
            converted.push(out);
            confidence_sum += confidence;
            word_count += 1;
        }

        let avg = if word_count > 0 {
            confidence_sum / word_count as f32
        } else {
            1.0
        };
        (converted.join(" "), avg)
    }

    /// Convert only the Shahmukhi words of a mixed-script text, leaving
    /// everything else untouched.
    pub fn convert_mixed(&self, text: &str) -> (String, f32) {
        let text: String = text.nfc().collect();
        let mut converted = Vec::new();
        let mut confidence_sum = 0.0f32;
        let mut word_count = 0usize;

        for word in text.split_whitespace() {
            let has_shahmukhi = word.chars().any(crate::chars::is_shahmukhi);
            if has_shahmukhi {
                let (out, confidence) = self.convert_word(word);
                converted.push(out);
                confidence_sum += confidence;
            } else {
                converted.push(word.to_string());
                confidence_sum += 1.0;
            }
            word_count += 1;
        }

        let avg = if word_count > 0 {
            confidence_sum / word_count as f32
        } else {
            1.0
        };
        (converted.join(" "), avg)
    }

    fn convert_word(&self, word: &str) -> (String, f32) {
        if self.use_lexicon {
            if let Some(gurmukhi) = SHAHMUKHI_LEXICON.get(word) {
                return (gurmukhi.to_string(), CONF_LEXICON);
            }
        }
        self.convert_word_by_rules(word)
    }

    fn convert_word_by_rules(&self, word: &str) -> (String, f32) {
        let chars: Vec<char> = word.chars().collect();
        let mut out = String::new();
        let mut confidence_sum = 0.0f32;
        let mut scored = 0usize;
        // Whether the next vowel letter is word-initial for inference
        // purposes: true until the first base letter lands.
        let mut at_word_start = true;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            // Aspirate digraph: consonant + do-chashmi he.
            if i + 1 < chars.len() && chars[i + 1] == DO_CHASHMI_HE {
                let digraph: String = [c, DO_CHASHMI_HE].iter().collect();
                if let Some(&aspirated) = SHAHMUKHI_ASPIRATES.get(digraph.as_str()) {
                    out.push(aspirated);
                    confidence_sum += CONF_CONSONANT;
                    scored += 1;
                    at_word_start = false;
                    i += 2;
                    continue;
                }
            }

            if c == NOON_GHUNNA {
                // Nasal mark; the normalizer picks tippi vs bindi later.
                out.push(BINDI);
                confidence_sum += CONF_CONSONANT;
                scored += 1;
                i += 1;
                continue;
            }

            if c == SHADDA {
                // Gemination of the previous consonant: adhak precedes it.
                if let Some(last) = out.pop() {
                    out.push(ADHAK);
                    out.push(last);
                }
                confidence_sum += CONF_DIACRITIC;
                scored += 1;
                i += 1;
                continue;
            }

            if let Some(mapped) = SHAHMUKHI_DIACRITICS.get(&c) {
                out.push_str(mapped);
                confidence_sum += CONF_DIACRITIC;
                scored += 1;
                i += 1;
                continue;
            }

            if let Some(&(initial, medial)) = SHAHMUKHI_VOWELS.get(&c) {
                out.push_str(if at_word_start { initial } else { medial });
                confidence_sum += CONF_VOWEL;
                scored += 1;
                at_word_start = false;
                i += 1;
                continue;
            }

            if let Some(mapped) = SHAHMUKHI_CONSONANTS.get(&c) {
                out.push_str(mapped);
                confidence_sum += CONF_CONSONANT;
                scored += 1;
                at_word_start = false;
                i += 1;
                continue;
            }

            if c == DO_CHASHMI_HE || is_silent_shahmukhi(c) {
                // Aspiration carrier without a pairing, or a silent letter.
                confidence_sum += CONF_DIACRITIC;
                scored += 1;
                i += 1;
                continue;
            }

            if c.is_ascii_digit() || c.is_ascii_punctuation() {
                out.push(c);
                confidence_sum += 1.0;
                scored += 1;
                i += 1;
                continue;
            }

            // Unknown codepoint: content is never discarded.
            debug!(codepoint = %format!("U+{:04X}", c as u32), "unknown Shahmukhi character");
            out.push(c);
            confidence_sum += CONF_UNKNOWN;
            scored += 1;
            at_word_start = false;
            i += 1;
        }

        let confidence = if scored > 0 {
            confidence_sum / scored as f32
        } else {
            1.0
        };
        (out, confidence)
    }
}

impl Default for ShahmukhiConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_words() {
        let converter = ShahmukhiConverter::default();
        let (out, confidence) = converter.convert("دھن گرو نانک");
        assert_eq!(out, "ਧੰਨ ਗੁਰੂ ਨਾਨਕ");
        assert!(confidence >= 0.9);
    }

    #[test]
    fn test_rule_layer_consonant_word() {
        let converter = ShahmukhiConverter::new(false);
        // نانک by rules: n + medial alif + n + k
        let (out, confidence) = converter.convert("نانک");
        assert_eq!(out, "ਨਾਨਕ");
        assert!(confidence > 0.8);
    }

    #[test]
    fn test_aspirate_digraph() {
        let converter = ShahmukhiConverter::new(false);
        let (out, _) = converter.convert("دھرم");
        assert!(out.starts_with('ਧ'), "got {out}");
    }

    #[test]
    fn test_nasal_ghunna_becomes_mark() {
        let converter = ShahmukhiConverter::new(false);
        let (out, _) = converter.convert("ماں");
        assert!(out.contains('\u{0A02}'), "got {out}");
    }

    #[test]
    fn test_empty_input() {
        let converter = ShahmukhiConverter::default();
        let (out, confidence) = converter.convert("   ");
        assert!(out.is_empty());
        assert_eq!(confidence, 1.0);
    }

    #[test]
    fn test_mixed_preserves_non_shahmukhi_words() {
        let converter = ShahmukhiConverter::default();
        let (out, _) = converter.convert_mixed("ਗੁਰੂ دھن ji");
        assert!(out.contains("ਗੁਰੂ"));
        assert!(out.contains("ਧੰਨ"));
        assert!(out.contains("ji"));
    }

    #[test]
    fn test_unknown_codepoints_pass_through() {
        let converter = ShahmukhiConverter::new(false);
        let (out, confidence) = converter.convert("§");
        assert_eq!(out, "§");
        assert!(confidence < 0.7);
    }
}
