//! Script detection by codepoint counting.

use tracing::debug;

use katha_core::DetectedScript;

use crate::chars;

/// Minimum alphanumeric codepoints before detection is trusted.
const MIN_CHARS_FOR_DETECTION: usize = 2;

/// Detects the dominant script of a text.
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    /// Two scripts whose shares are within this delta detect as mixed.
    mix_delta: f32,
}

impl ScriptDetector {
    pub fn new(mix_delta: f32) -> Self {
        Self { mix_delta }
    }

    /// Detect the dominant script and a confidence in [0, 1].
    pub fn detect(&self, text: &str) -> (DetectedScript, f32) {
        if text.trim().is_empty() {
            return (DetectedScript::Empty, 1.0);
        }

        let mut gurmukhi = 0usize;
        let mut shahmukhi = 0usize;
        let mut devanagari = 0usize;
        let mut latin = 0usize;
        let mut total = 0usize;

        for c in text.chars() {
            if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() {
                continue;
            }
            total += 1;
            if chars::is_gurmukhi(c) {
                gurmukhi += 1;
            } else if chars::is_shahmukhi(c) {
                shahmukhi += 1;
            } else if chars::is_devanagari(c) {
                devanagari += 1;
            } else if chars::is_latin_letter(c) {
                latin += 1;
            }
        }

        if total < MIN_CHARS_FOR_DETECTION {
            return (DetectedScript::Unknown, 0.5);
        }

        let mut shares = [
            (DetectedScript::Gurmukhi, gurmukhi as f32 / total as f32),
            (DetectedScript::Shahmukhi, shahmukhi as f32 / total as f32),
            (DetectedScript::Devanagari, devanagari as f32 / total as f32),
            (DetectedScript::Latin, latin as f32 / total as f32),
        ];
        shares.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (dominant, share) = shares[0];
        let (_, runner_up) = shares[1];

        if share == 0.0 {
            return (DetectedScript::Unknown, 0.5);
        }

        if runner_up > 0.0 && (share - runner_up) < self.mix_delta {
            debug!(share, runner_up, "mixed script detected");
            return (DetectedScript::Mixed, share);
        }

        // Longer samples earn a small boost; very short ones are penalized.
        let confidence = if total >= 10 {
            (share * 1.1).min(1.0)
        } else if total < 5 {
            share * 0.8
        } else {
            share
        };

        (dominant, confidence)
    }

    /// Detect with the ASR language code as a prior: a hint that matches
    /// boosts confidence, an uncertain detection defers to the hint, and a
    /// contradiction docks confidence.
    pub fn detect_with_hint(
        &self,
        text: &str,
        language_hint: Option<&str>,
    ) -> (DetectedScript, f32) {
        let (script, confidence) = self.detect(text);

        let Some(hint) = language_hint else {
            return (script, confidence);
        };

        let expected = match hint.to_ascii_lowercase().as_str() {
            "ur" => Some(DetectedScript::Shahmukhi),
            "pa" => Some(DetectedScript::Gurmukhi),
            "hi" => Some(DetectedScript::Devanagari),
            "en" => Some(DetectedScript::Latin),
            _ => None,
        };

        match expected {
            Some(expected) if script == expected => (script, (confidence * 1.1).min(1.0)),
            Some(expected)
                if matches!(script, DetectedScript::Mixed | DetectedScript::Unknown) =>
            {
                // Uncertain detection defers to the hint at moderate confidence.
                (expected, 0.7)
            }
            Some(expected) => {
                debug!(
                    detected = script.as_str(),
                    expected = expected.as_str(),
                    "script does not match language hint"
                );
                (script, confidence * 0.9)
            }
            None => (script, confidence),
        }
    }
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self::new(0.2)
    }
}
