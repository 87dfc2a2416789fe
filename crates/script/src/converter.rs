//! The script conversion facade.
//!
//! Takes a fused ASR text plus a language hint and produces the dual
//! Gurmukhi/Roman rendition with a conversion confidence. English passes
//! through unchanged; content is never discarded.

use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use katha_config::ScriptConfig;
use katha_core::{ConvertedText, DetectedScript};

use crate::chars::gurmukhi_purity;
use crate::detect::ScriptDetector;
use crate::normalize::GurmukhiNormalizer;
use crate::roman::Romanizer;
use crate::shahmukhi::ShahmukhiConverter;
use crate::ScriptError;

pub struct ScriptConverter {
    detector: ScriptDetector,
    shahmukhi: ShahmukhiConverter,
    normalizer: GurmukhiNormalizer,
    romanizer: Romanizer,
    review_floor: f32,
    strict_gurmukhi: bool,
    purity_floor: f32,
}

impl ScriptConverter {
    pub fn new(config: &ScriptConfig) -> Result<Self, ScriptError> {
        Ok(Self {
            detector: ScriptDetector::new(config.script_mix_delta),
            shahmukhi: ShahmukhiConverter::new(config.dictionary_lookup),
            normalizer: GurmukhiNormalizer::from_form_name(&config.unicode_form)?,
            romanizer: Romanizer::new(config.romanization_scheme, config.capitalize_roman),
            review_floor: config.script_review_floor,
            strict_gurmukhi: config.strict_gurmukhi,
            purity_floor: config.script_purity_floor,
        })
    }

    /// The romanizer in use, shared with the canonical replacer so
    /// replaced quotes romanize under the same scheme.
    pub fn romanizer(&self) -> &Romanizer {
        &self.romanizer
    }

    /// Convert one text to its Gurmukhi + Roman rendition.
    pub fn convert(&self, text: &str, language_hint: Option<&str>) -> ConvertedText {
        if text.trim().is_empty() {
            return ConvertedText::empty(text);
        }

        let text: String = text.nfc().collect();
        let (script, detect_confidence) = self.detector.detect_with_hint(&text, language_hint);
        debug!(
            script = script.as_str(),
            confidence = detect_confidence,
            "detected script"
        );

        let (gurmukhi, convert_confidence) = match script {
            DetectedScript::Gurmukhi => (self.normalizer.normalize(&text), 1.0),
            DetectedScript::Shahmukhi => {
                let (converted, confidence) = self.shahmukhi.convert(&text);
                (self.normalizer.normalize(&converted), confidence)
            }
            DetectedScript::Mixed => {
                let (converted, confidence) = self.shahmukhi.convert_mixed(&text);
                (self.normalizer.normalize(&converted), confidence)
            }
            DetectedScript::Latin => (text.clone(), 1.0),
            DetectedScript::Devanagari | DetectedScript::Unknown => {
                // No conversion path; keep the content, confidence low.
                (text.clone(), 0.5)
            }
            DetectedScript::Empty => (String::new(), 1.0),
        };

        let roman = if script == DetectedScript::Latin {
            text.clone()
        } else {
            self.romanizer.transliterate(&gurmukhi)
        };

        let confidence = detect_confidence * convert_confidence;
        let mut needs_review = confidence < self.review_floor;

        if self.strict_gurmukhi
            && script != DetectedScript::Latin
            && gurmukhi_purity(&gurmukhi) < self.purity_floor
        {
            warn!(
                purity = gurmukhi_purity(&gurmukhi),
                floor = self.purity_floor,
                "strict Gurmukhi purity check failed"
            );
            needs_review = true;
        }

        ConvertedText {
            original_text: text,
            original_script: script,
            gurmukhi,
            roman,
            conversion_confidence: confidence,
            needs_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_config::RomanScheme;

    fn converter() -> ScriptConverter {
        ScriptConverter::new(&ScriptConfig::default()).unwrap()
    }

    #[test]
    fn test_gurmukhi_passes_through_normalized() {
        let converted = converter().convert("ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ", Some("pa"));
        assert_eq!(converted.original_script, DetectedScript::Gurmukhi);
        assert_eq!(converted.gurmukhi, "ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ");
        assert_eq!(converted.roman, "dhan gurū nānak dev jī");
        assert!(converted.conversion_confidence > 0.9);
        assert!(!converted.needs_review);
    }

    #[test]
    fn test_shahmukhi_converted() {
        let converted = converter().convert("دھن گرو نانک", Some("pa"));
        assert_eq!(converted.original_script, DetectedScript::Shahmukhi);
        assert_eq!(converted.gurmukhi, "ਧੰਨ ਗੁਰੂ ਨਾਨਕ");
        assert_eq!(converted.roman, "dhan gurū nānak");
        assert!(converted.conversion_confidence >= 0.7);
        assert!(!converted.needs_review);
    }

    #[test]
    fn test_english_passes_through() {
        let converted = converter().convert("waheguru ji ka khalsa", Some("en"));
        assert_eq!(converted.original_script, DetectedScript::Latin);
        assert_eq!(converted.gurmukhi, "waheguru ji ka khalsa");
        assert_eq!(converted.roman, "waheguru ji ka khalsa");
        assert_eq!(converted.conversion_confidence, 1.0);
    }

    #[test]
    fn test_empty_input() {
        let converted = converter().convert("   ", None);
        assert_eq!(converted.original_script, DetectedScript::Empty);
        assert!(converted.gurmukhi.is_empty());
        assert!(converted.roman.is_empty());
        assert_eq!(converted.conversion_confidence, 1.0);
    }

    #[test]
    fn test_unknown_script_flagged() {
        let converted = converter().convert("日本語のテキストです", None);
        assert!(converted.needs_review);
        // Content is never discarded.
        assert!(!converted.gurmukhi.is_empty());
    }

    #[test]
    fn test_strict_mode_flags_impure_output() {
        let mut config = ScriptConfig::default();
        config.strict_gurmukhi = true;
        let converter = ScriptConverter::new(&config).unwrap();
        // Mostly Gurmukhi with a stray Latin token; dominant script is
        // Gurmukhi but purity falls below the floor.
        let converted = converter.convert("ਗੁਰੂ ਸਾਹਿਬ ਬਾਣੀ ਵਿਚ ਫੁਰਮਾਉਂਦੇ ok", Some("pa"));
        assert!(converted.needs_review);
    }

    #[test]
    fn test_iso_scheme_selected() {
        let mut config = ScriptConfig::default();
        config.romanization_scheme = RomanScheme::Iso15919;
        let converter = ScriptConverter::new(&config).unwrap();
        let converted = converter.convert("ਦੇਵ", Some("pa"));
        assert_eq!(converted.roman, "dēva");
    }

    #[test]
    fn test_invalid_unicode_form_rejected() {
        let mut config = ScriptConfig::default();
        config.unicode_form = "NFZ".to_string();
        assert!(ScriptConverter::new(&config).is_err());
    }
}
