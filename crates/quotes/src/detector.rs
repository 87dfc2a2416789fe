//! High-recall quote candidate detection.
//!
//! A segment becomes a candidate if any signal fires; the candidate's
//! confidence is the maximum of the firing signals and every firing
//! reason is kept in order for audit.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use katha_config::QuoteConfig;
use katha_core::{QuoteCandidate, Route};
use katha_scripture::{tokenize, ScriptureIndex};

/// Per-signal detection confidences, strongest cue first.
const CONF_ROUTE_HINT: f32 = 0.6;
const CONF_CUE_PATTERN: f32 = 0.7;
const CONF_VOCAB_DENSITY: f32 = 0.5;
const CONF_ARCHAIC_LINE: f32 = 0.4;

/// Vocabulary markers far more common in Gurbani than modern speech.
/// The corpus vocabulary extends this set at runtime.
static GURBANI_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "ਵਾਹਿਗੁਰੂ", "ਸਤਿਗੁਰੂ", "ਗੁਰੂ", "ਬਾਣੀ", "ਸ਼ਬਦ", "ਅੰਗ", "ਰਾਗ", "ਪਾਤਸ਼ਾਹ", "ਮਹਲਾ",
        "ਭਗਤ", "ਸੰਤ", "ਗੁਰਮੁਖ", "ਮਨਮੁਖ", "ਮਾਇਆ", "ਮੋਹ", "ਅਹੰਕਾਰ", "ਸਿਮਰਨ", "ਨਾਮ",
        "ਨਾਮੁ", "ਧਿਆਨ", "ਧਰਮ", "ਕਰਮ", "ਪ੍ਰਭੂ", "ਰਾਮ", "ਹਰਿ", "ਗੋਬਿੰਦ", "ਕਿਰਪਾ", "ਦਇਆ",
        "ਮਿਹਰ", "ਭਾਣਾ", "ਹੁਕਮ", "ਸਤਿ", "ਕਰਤਾ", "ਪੁਰਖੁ",
    ])
});

/// Line-final markers of shabad structure (danda, double danda).
fn ends_with_shabad_marker(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.ends_with('॥') || trimmed.ends_with('।')
}

pub struct QuoteCandidateDetector {
    cue_patterns: Vec<(String, Regex)>,
    vocab_ratio_floor: f32,
    min_words: usize,
    max_words: usize,
    index: Arc<ScriptureIndex>,
}

impl QuoteCandidateDetector {
    pub fn new(config: &QuoteConfig, index: Arc<ScriptureIndex>) -> Self {
        let cue_patterns = config
            .cue_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some((pattern.clone(), regex)),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "skipping invalid cue pattern");
                    None
                }
            })
            .collect();

        Self {
            cue_patterns,
            vocab_ratio_floor: config.vocab_ratio_floor,
            min_words: config.quote_min_words,
            max_words: config.quote_max_words,
            index,
        }
    }

    /// Detect candidates over the segment's text variants (fused Gurmukhi
    /// first, then per-engine renditions). Candidates sharing the same
    /// text are merged.
    pub fn detect(&self, variants: &[String], route: Route) -> Vec<QuoteCandidate> {
        let mut candidates: Vec<QuoteCandidate> = Vec::new();

        for text in variants {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let mut firing: Vec<(f32, String)> = Vec::new();

            if route == Route::ScriptureQuoteLikely {
                firing.push((CONF_ROUTE_HINT, "route_hint".to_string()));
            }

            for (pattern, regex) in &self.cue_patterns {
                if regex.is_match(text) {
                    firing.push((CONF_CUE_PATTERN, format!("phrase_cue: {pattern}")));
                    break;
                }
            }

            let tokens = tokenize(text);
            if !tokens.is_empty() {
                let vocab_hits = tokens
                    .iter()
                    .filter(|t| {
                        GURBANI_MARKERS.contains(t.as_str()) || self.index.vocabulary_contains(t)
                    })
                    .count();
                let ratio = vocab_hits as f32 / tokens.len() as f32;
                if ratio >= self.vocab_ratio_floor {
                    firing.push((
                        CONF_VOCAB_DENSITY,
                        format!("vocabulary_density: {ratio:.2}"),
                    ));
                }
            }

            let word_count = tokens.len();
            if (self.min_words..=self.max_words).contains(&word_count)
                && ends_with_shabad_marker(text)
            {
                firing.push((CONF_ARCHAIC_LINE, "archaic_line_structure".to_string()));
            }

            if firing.is_empty() {
                continue;
            }

            // Merge into an existing candidate with the same text.
            if let Some(existing) = candidates.iter_mut().find(|c| c.text == text) {
                for (confidence, reason) in firing {
                    if !existing.reasons.contains(&reason) {
                        existing.add_signal(confidence, reason);
                    }
                }
                continue;
            }

            let mut candidate: Option<QuoteCandidate> = None;
            for (confidence, reason) in firing {
                match candidate.as_mut() {
                    None => candidate = Some(QuoteCandidate::new(text, confidence, reason)),
                    Some(existing) => existing.add_signal(confidence, reason),
                }
            }
            if let Some(candidate) = candidate {
                debug!(
                    text = %candidate.text,
                    confidence = candidate.detection_confidence,
                    "quote candidate detected"
                );
                candidates.push(candidate);
            }
        }

        // Strongest first so the matcher leads with the best variant.
        candidates.sort_by(|a, b| {
            b.detection_confidence
                .partial_cmp(&a.detection_confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }
}
