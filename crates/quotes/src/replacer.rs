//! Canonical replacement with provenance.
//!
//! Decision table, evaluated in order:
//! - `match_confidence >= auto_replace_floor`: replace text with the
//!   canonical line, keep spoken text, kind becomes scripture_quote.
//! - `review_floor <= match_confidence < auto_replace_floor`: attach the
//!   match as a suggestion, do not replace, flag for review.
//! - below `review_floor`: discard the match.

use tracing::{debug, info};

use katha_config::QuoteConfig;
use katha_core::{ProcessedSegment, QuoteMatch, SegmentKind};
use katha_script::Romanizer;

/// What the replacer decided, recorded in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementDecision {
    Replaced,
    Suggested,
    Discarded,
}

pub struct CanonicalReplacer {
    auto_replace_floor: f32,
    review_floor: f32,
    romanizer: Romanizer,
}

impl CanonicalReplacer {
    pub fn new(config: &QuoteConfig, romanizer: Romanizer) -> Self {
        Self {
            auto_replace_floor: config.auto_replace_floor,
            review_floor: config.review_floor,
            romanizer,
        }
    }

    /// Apply the decision table to a segment. The spoken text always
    /// survives; replacement only rewrites the Gurmukhi/Roman fields.
    pub fn apply(
        &self,
        segment: &mut ProcessedSegment,
        quote_match: QuoteMatch,
    ) -> ReplacementDecision {
        if quote_match.match_confidence >= self.auto_replace_floor {
            info!(
                line_id = %quote_match.line_id,
                confidence = quote_match.match_confidence,
                "replacing with canonical text"
            );

            segment.gurmukhi = quote_match.canonical_gurmukhi.clone();
            segment.roman = match &quote_match.canonical_roman {
                Some(roman) => roman.clone(),
                None => self.romanizer.transliterate(&quote_match.canonical_gurmukhi),
            };
            segment.kind = SegmentKind::ScriptureQuote;
            segment.needs_review = false;
            segment.quote_match = Some(quote_match);
            return ReplacementDecision::Replaced;
        }

        if quote_match.match_confidence >= self.review_floor {
            debug!(
                line_id = %quote_match.line_id,
                confidence = quote_match.match_confidence,
                "attaching match as suggestion"
            );
            segment.needs_review = true;
            segment.quote_match = Some(quote_match);
            return ReplacementDecision::Suggested;
        }

        debug!(
            confidence = quote_match.match_confidence,
            "discarding low-confidence match"
        );
        ReplacementDecision::Discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_config::{QuoteConfig, RomanScheme};
    use katha_core::{
        EngineId, Hypothesis, Route, RouteDecision, ScriptureLine, ScriptureSource,
    };

    fn segment(text: &str) -> ProcessedSegment {
        ProcessedSegment {
            segment_id: ProcessedSegment::new_segment_id(),
            chunk_index: 0,
            start_sec: 0.0,
            end_sec: 4.0,
            kind: SegmentKind::Speech,
            spoken_text: text.to_string(),
            gurmukhi: text.to_string(),
            roman: String::new(),
            language: "pa".to_string(),
            original_script: katha_core::DetectedScript::Gurmukhi,
            route: RouteDecision::new(Route::ScriptureQuoteLikely, "cue"),
            asr_confidence: 0.88,
            script_confidence: 1.0,
            quote_match: None,
            needs_review: false,
            per_engine_hypotheses: vec![Hypothesis::new(EngineId::General, text, "pa", 0.88)],
            errors: Vec::new(),
        }
    }

    fn quote_match(confidence: f32, roman: Option<&str>) -> QuoteMatch {
        let mut line =
            ScriptureLine::new("L1", ScriptureSource::Sggs, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ").with_ang(1);
        if let Some(roman) = roman {
            line = line.with_roman(roman);
        }
        QuoteMatch::from_line(&line, confidence, confidence, confidence)
    }

    fn replacer() -> CanonicalReplacer {
        CanonicalReplacer::new(
            &QuoteConfig::default(),
            Romanizer::new(RomanScheme::Practical, false),
        )
    }

    #[test]
    fn test_high_confidence_replaces() {
        let mut seg = segment("ਸਤ ਨਾਮ ਕਰਤਾ ਪੁਰਖ");
        let decision = replacer().apply(&mut seg, quote_match(0.95, Some("sat nām kartā purakh")));
        assert_eq!(decision, ReplacementDecision::Replaced);
        assert_eq!(seg.kind, SegmentKind::ScriptureQuote);
        assert_eq!(seg.gurmukhi, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ");
        assert_eq!(seg.roman, "sat nām kartā purakh");
        // Provenance: the spoken text survives.
        assert_eq!(seg.spoken_text, "ਸਤ ਨਾਮ ਕਰਤਾ ਪੁਰਖ");
        assert!(!seg.needs_review);
        assert!(seg.quote_match.is_some());
    }

    #[test]
    fn test_replacement_re_romanizes_when_no_canonical_roman() {
        let mut seg = segment("ਸਤ ਨਾਮ");
        let decision = replacer().apply(&mut seg, quote_match(0.92, None));
        assert_eq!(decision, ReplacementDecision::Replaced);
        assert_eq!(seg.roman, "sati nāmu karatā purakhu");
    }

    #[test]
    fn test_review_band_suggests_without_replacing() {
        let mut seg = segment("ਸਤ ਨਾਮ ਕਰਤਾ ਪੁਰਖ");
        let decision = replacer().apply(&mut seg, quote_match(0.82, None));
        assert_eq!(decision, ReplacementDecision::Suggested);
        assert_eq!(seg.kind, SegmentKind::Speech);
        assert_eq!(seg.gurmukhi, "ਸਤ ਨਾਮ ਕਰਤਾ ਪੁਰਖ");
        assert!(seg.needs_review);
        assert!(seg.quote_match.is_some());
    }

    #[test]
    fn test_below_review_floor_discards() {
        let mut seg = segment("ਸਤ ਨਾਮ ਕਰਤਾ ਪੁਰਖ");
        let decision = replacer().apply(&mut seg, quote_match(0.5, None));
        assert_eq!(decision, ReplacementDecision::Discarded);
        assert_eq!(seg.kind, SegmentKind::Speech);
        assert!(seg.quote_match.is_none());
        assert!(!seg.needs_review);
    }
}
