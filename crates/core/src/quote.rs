//! Quote candidates and matches produced by the quote engine.

use serde::{Deserialize, Serialize};

use crate::scripture::{ScriptureLine, ScriptureSource};

/// A chunk flagged as possibly containing scripture. Transient: either
/// promoted into a [`QuoteMatch`] or dropped, but the detection reasons are
/// kept on the segment for audit either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCandidate {
    /// Candidate text, taken from whichever hypothesis variant fired.
    pub text: String,
    /// Maximum confidence across the signals that fired.
    pub detection_confidence: f32,
    /// Signals that fired, in firing order (route-hint, phrase-cue, …).
    pub reasons: Vec<String>,
}

impl QuoteCandidate {
    pub fn new(text: impl Into<String>, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detection_confidence: confidence.clamp(0.0, 1.0),
            reasons: vec![reason.into()],
        }
    }

    /// Merge another firing signal into this candidate, keeping the
    /// maximum confidence and appending the reason.
    pub fn add_signal(&mut self, confidence: f32, reason: impl Into<String>) {
        self.detection_confidence = self.detection_confidence.max(confidence.clamp(0.0, 1.0));
        self.reasons.push(reason.into());
    }
}

/// A verified attachment of a candidate to a canonical scripture line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteMatch {
    pub source: ScriptureSource,
    pub line_id: String,
    /// Canonical Gurmukhi text from the index.
    pub canonical_gurmukhi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_roman: Option<String>,
    /// Combined score from the matcher; drives the replacement decision.
    pub match_confidence: f32,
    pub fuzzy_score: f32,
    pub semantic_score: f32,
    /// Whether stage C verifier rules all passed.
    pub verifier_passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ang: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Neighbouring lines of the matched shabad, for renderers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_lines: Vec<String>,
}

impl QuoteMatch {
    pub fn from_line(
        line: &ScriptureLine,
        match_confidence: f32,
        fuzzy_score: f32,
        semantic_score: f32,
    ) -> Self {
        Self {
            source: line.source,
            line_id: line.line_id.clone(),
            canonical_gurmukhi: line.gurmukhi.clone(),
            canonical_roman: line.roman.clone(),
            match_confidence: match_confidence.clamp(0.0, 1.0),
            fuzzy_score,
            semantic_score,
            verifier_passed: true,
            ang: line.ang,
            raag: line.raag.clone(),
            author: line.author.clone(),
            context_lines: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_signal_merge() {
        let mut candidate = QuoteCandidate::new("ਸਤਿ ਨਾਮੁ", 0.6, "route_hint");
        candidate.add_signal(0.7, "phrase_cue");
        candidate.add_signal(0.5, "vocabulary_density");
        assert!((candidate.detection_confidence - 0.7).abs() < f32::EPSILON);
        assert_eq!(candidate.reasons.len(), 3);
        assert_eq!(candidate.reasons[0], "route_hint");
    }

    #[test]
    fn test_match_carries_line_metadata() {
        let line = ScriptureLine::new("42", ScriptureSource::Sggs, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ")
            .with_ang(1)
            .with_roman("sat nām kartā purakh");
        let m = QuoteMatch::from_line(&line, 0.95, 0.97, 0.92);
        assert_eq!(m.ang, Some(1));
        assert_eq!(m.canonical_roman.as_deref(), Some("sat nām kartā purakh"));
        assert!(m.verifier_passed);
    }
}
