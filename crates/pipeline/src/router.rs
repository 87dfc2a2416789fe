//! Language/domain routing.
//!
//! Routes guide the ASR fan-out. The router weighs, in order: scripture
//! cue phrases on the quick hypothesis, per-language classifier scores
//! against `langid_floor` / `langid_tie_delta`, the prior route of the
//! job, and falls back to `unknown`. The winning rule is recorded in the
//! decision's reason string.

use tracing::debug;

use katha_config::RouterConfig;
use katha_core::{AudioChunk, Hypothesis, Route, RouteDecision};

pub struct Router {
    config: RouterConfig,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Route one chunk. `quick` is the general engine's first-pass
    /// hypothesis when available; `prior` is the previous chunk's route
    /// within the same job.
    pub fn route(
        &self,
        chunk: &AudioChunk,
        quick: Option<&Hypothesis>,
        prior: Option<Route>,
    ) -> RouteDecision {
        // Rule 1: scripture cue phrase on a short chunk.
        if let Some(hyp) = quick {
            if chunk.duration_sec() < self.config.scripture_short_sec {
                if let Some(cue) = self.matching_cue(&hyp.text) {
                    return RouteDecision::new(
                        Route::ScriptureQuoteLikely,
                        format!("cue_phrase: {cue}"),
                    );
                }
                if looks_like_scripture(&hyp.text) {
                    return RouteDecision::new(
                        Route::ScriptureQuoteLikely,
                        "gurmukhi_density_short_chunk",
                    );
                }
            }
        }

        // Rule 2/3: classifier scores with floor and tie delta.
        let (pa_score, en_score) = self.language_scores(quick);
        debug!(pa_score, en_score, "language scores");

        let (leader, leader_score, runner_score) = if pa_score >= en_score {
            (Route::Punjabi, pa_score, en_score)
        } else {
            (Route::English, en_score, pa_score)
        };

        if leader_score >= self.config.langid_floor {
            if (leader_score - runner_score).abs() < self.config.langid_tie_delta
                && runner_score > 0.0
            {
                return RouteDecision::new(
                    Route::Mixed,
                    format!("langid_tie: pa={pa_score:.2} en={en_score:.2}"),
                );
            }
            return RouteDecision::new(
                leader,
                format!("langid: {}={leader_score:.2}", leader.as_str()),
            );
        }

        // Rule 4: carry the prior route when the classifier is unsure.
        if let Some(prior) = prior {
            if prior != Route::Unknown {
                return RouteDecision::new(prior, "prior_route");
            }
        }

        RouteDecision::new(Route::Unknown, "below_langid_floor")
    }

    fn matching_cue(&self, text: &str) -> Option<&str> {
        self.config
            .scripture_cues
            .iter()
            .find(|cue| text.contains(cue.as_str()))
            .map(|cue| cue.as_str())
    }

    /// Blend the engine's own language id with a script-ratio heuristic
    /// over the hypothesis text.
    fn language_scores(&self, quick: Option<&Hypothesis>) -> (f32, f32) {
        let Some(hyp) = quick else {
            return (0.0, 0.0);
        };
        if hyp.is_empty() {
            return (0.0, 0.0);
        }

        let (indic_ratio, latin_ratio) = script_ratios(&hyp.text);

        let mut pa = indic_ratio;
        let mut en = latin_ratio;
        match hyp.language.as_str() {
            "pa" | "ur" | "hi" => pa = pa.max(hyp.confidence),
            "en" => en = en.max(hyp.confidence),
            _ => {}
        }

        (pa, en)
    }
}

/// Share of Indic (Gurmukhi/Arabic/Devanagari) and Latin letters.
fn script_ratios(text: &str) -> (f32, f32) {
    let mut indic = 0usize;
    let mut latin = 0usize;
    let mut total = 0usize;

    for c in text.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() {
            continue;
        }
        total += 1;
        match c as u32 {
            0x0A00..=0x0A7F | 0x0600..=0x06FF | 0x0900..=0x097F => indic += 1,
            _ if c.is_ascii_alphabetic() => latin += 1,
            _ => {}
        }
    }

    if total == 0 {
        (0.0, 0.0)
    } else {
        (indic as f32 / total as f32, latin as f32 / total as f32)
    }
}

/// Heuristic for Gurbani-like content: dominantly Gurmukhi text.
fn looks_like_scripture(text: &str) -> bool {
    let mut gurmukhi = 0usize;
    let mut total = 0usize;
    for c in text.chars() {
        if c.is_alphanumeric() {
            total += 1;
            if ('\u{0A00}'..='\u{0A7F}').contains(&c) {
                gurmukhi += 1;
            }
        }
    }
    // Danda markers are a strong structural signal on their own.
    if text.trim_end().ends_with('॥') {
        return true;
    }
    total > 0 && gurmukhi * 2 > total && text.split_whitespace().count() <= 12
}
