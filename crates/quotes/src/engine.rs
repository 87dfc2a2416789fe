//! The quote engine facade: detect → match → replace on one segment.

use std::sync::Arc;

use tracing::warn;

use katha_config::QuoteConfig;
use katha_core::{ProcessedSegment, Route};
use katha_script::Romanizer;
use katha_scripture::ScriptureIndex;

use crate::detector::QuoteCandidateDetector;
use crate::matcher::AssistedMatcher;
use crate::replacer::{CanonicalReplacer, ReplacementDecision};
use crate::semantic::SemanticScorer;

/// What the engine did with a segment, for metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteOutcome {
    pub candidates: usize,
    pub matched: bool,
    pub replaced: bool,
}

pub struct QuoteEngine {
    detector: QuoteCandidateDetector,
    matcher: AssistedMatcher,
    replacer: CanonicalReplacer,
    context_radius: u32,
    index: Arc<ScriptureIndex>,
}

impl QuoteEngine {
    pub fn new(config: &QuoteConfig, index: Arc<ScriptureIndex>, romanizer: Romanizer) -> Self {
        Self {
            detector: QuoteCandidateDetector::new(config, Arc::clone(&index)),
            matcher: AssistedMatcher::new(config, Arc::clone(&index)),
            replacer: CanonicalReplacer::new(config, romanizer),
            context_radius: config.context_radius,
            index,
        }
    }

    /// Build with a custom semantic scorer (embedding index).
    pub fn with_scorer(
        config: &QuoteConfig,
        index: Arc<ScriptureIndex>,
        romanizer: Romanizer,
        scorer: Box<dyn SemanticScorer>,
    ) -> Self {
        Self {
            detector: QuoteCandidateDetector::new(config, Arc::clone(&index)),
            matcher: AssistedMatcher::with_scorer(config, Arc::clone(&index), scorer),
            replacer: CanonicalReplacer::new(config, romanizer),
            context_radius: config.context_radius,
            index,
        }
    }

    /// Run the full quote path over a converted segment. `variants` are
    /// every available Gurmukhi rendition of the chunk (fused text first,
    /// then per-engine conversions). Faults demote the segment to plain
    /// speech with `needs_review`; they never propagate.
    pub fn process(&self, segment: &mut ProcessedSegment, variants: &[String]) -> QuoteOutcome {
        let mut outcome = QuoteOutcome::default();

        let candidates = self.detector.detect(variants, segment.route.route);
        outcome.candidates = candidates.len();
        if candidates.is_empty() {
            return outcome;
        }

        // Detection reasons are audit data whether or not a match lands.
        for candidate in &candidates {
            for reason in &candidate.reasons {
                let note = format!("quote_candidate: {reason}");
                if !segment.errors.contains(&note) {
                    segment.errors.push(note);
                }
            }
        }

        let quote_match = match self.matcher.find_match(&candidates, variants) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "quote matching failed; demoting candidate");
                segment.needs_review = true;
                segment.errors.push(format!("quote_match_error: {e}"));
                return outcome;
            }
        };

        let Some(mut quote_match) = quote_match else {
            return outcome;
        };
        outcome.matched = true;

        if self.context_radius > 0 {
            if let Ok(context) = self.index.get_context(&quote_match.line_id, self.context_radius)
            {
                quote_match.context_lines =
                    context.into_iter().map(|line| line.gurmukhi).collect();
            }
        }

        let decision = self.replacer.apply(segment, quote_match);
        outcome.replaced = decision == ReplacementDecision::Replaced;
        outcome
    }

    /// Dasam-likely chunks with no Dasam corpus loaded still match
    /// against SGGS only.
    pub fn search_scope_note(&self) -> &'static str {
        if self.index.has_dasam() {
            "sggs+dasam"
        } else {
            "sggs"
        }
    }
}

/// Whether a route warrants running the quote engine at all. Candidates
/// can also fire on vocabulary alone, so plain Punjabi routes still pass
/// through detection.
pub fn route_warrants_detection(route: Route) -> bool {
    !matches!(route, Route::English)
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_config::RomanScheme;
    use katha_core::{
        EngineId, Hypothesis, RouteDecision, ScriptureLine, ScriptureSource, SegmentKind,
    };

    fn index() -> Arc<ScriptureIndex> {
        Arc::new(ScriptureIndex::from_lines(vec![
            ScriptureLine::new("mool-1", ScriptureSource::Sggs, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ")
                .with_ang(1)
                .with_roman("sat nām kartā purakh")
                .with_shabad("mool", 1),
            ScriptureLine::new("mool-2", ScriptureSource::Sggs, "ਨਿਰਭਉ ਨਿਰਵੈਰੁ ਅਕਾਲ ਮੂਰਤਿ")
                .with_ang(1)
                .with_shabad("mool", 2),
        ]))
    }

    fn engine() -> QuoteEngine {
        QuoteEngine::new(
            &QuoteConfig::default(),
            index(),
            Romanizer::new(RomanScheme::Practical, false),
        )
    }

    fn segment(text: &str, route: Route) -> ProcessedSegment {
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
            route: RouteDecision::new(route, "test"),
            asr_confidence: 0.88,
            script_confidence: 1.0,
            quote_match: None,
            needs_review: false,
            per_engine_hypotheses: vec![Hypothesis::new(EngineId::General, text, "pa", 0.88)],
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_exact_quote_replaced_with_context() {
        let mut seg = segment("ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ", Route::ScriptureQuoteLikely);
        let variants = vec![seg.gurmukhi.clone()];
        let outcome = engine().process(&mut seg, &variants);

        assert!(outcome.matched);
        assert!(outcome.replaced);
        assert_eq!(seg.kind, SegmentKind::ScriptureQuote);
        let m = seg.quote_match.as_ref().unwrap();
        assert_eq!(m.ang, Some(1));
        assert!(!m.context_lines.is_empty());
    }

    #[test]
    fn test_no_candidate_for_plain_english() {
        let mut seg = segment("talking about the weather today", Route::English);
        let variants = vec![seg.gurmukhi.clone()];
        let outcome = engine().process(&mut seg, &variants);
        assert_eq!(outcome.candidates, 0);
        assert!(!outcome.matched);
        assert_eq!(seg.kind, SegmentKind::Speech);
    }

    #[test]
    fn test_candidate_without_index_hits_stays_speech() {
        let mut seg = segment("ਅੱਜ ਆਪਾਂ ਇਤਿਹਾਸ ਦੀ ਗੱਲ ਕਰਦੇ ਹਾਂ", Route::ScriptureQuoteLikely);
        let variants = vec![seg.gurmukhi.clone()];
        let outcome = engine().process(&mut seg, &variants);

        assert_eq!(outcome.candidates, 1);
        assert!(!outcome.matched);
        assert_eq!(seg.kind, SegmentKind::Speech);
        // Candidate reasons retained for audit.
        assert!(seg.errors.iter().any(|e| e.contains("route_hint")));
    }

    #[test]
    fn test_scope_note_reports_missing_dasam() {
        assert_eq!(engine().search_scope_note(), "sggs");
    }
}
