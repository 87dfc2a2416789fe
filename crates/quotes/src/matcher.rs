//! Assisted matching: three stages from candidate to canonical line.
//!
//! Stage A — fuzzy retrieval over every text variant, union of hits with
//! the best fuzzy score kept per line.
//! Stage B — semantic verification on stoplist-filtered content tokens,
//! combined with the fuzzy score by configured weights.
//! Stage C — verifier rules: token-count ratio bounds, a shared
//! distinctive content token, and the combined-score floor.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use katha_config::QuoteConfig;
use katha_core::{QuoteCandidate, QuoteMatch, Result, ScriptureLine};
use katha_scripture::{normalize_gurmukhi_query, tokenize, ScriptureIndex};

use crate::semantic::{SemanticScorer, TokenOverlapScorer};
use crate::stoplist::content_tokens;

pub struct AssistedMatcher {
    index: Arc<ScriptureIndex>,
    scorer: Box<dyn SemanticScorer>,
    fuzzy_weight: f32,
    semantic_weight: f32,
    verifier_floor: f32,
    len_ratio_lo: f32,
    len_ratio_hi: f32,
    top_k: usize,
}

impl AssistedMatcher {
    pub fn new(config: &QuoteConfig, index: Arc<ScriptureIndex>) -> Self {
        Self::with_scorer(config, index, Box::new(TokenOverlapScorer))
    }

    /// Use a custom semantic scorer (e.g. an embedding index).
    pub fn with_scorer(
        config: &QuoteConfig,
        index: Arc<ScriptureIndex>,
        scorer: Box<dyn SemanticScorer>,
    ) -> Self {
        Self {
            index,
            scorer,
            fuzzy_weight: config.fuzzy_weight,
            semantic_weight: config.semantic_weight,
            verifier_floor: config.verifier_floor,
            len_ratio_lo: config.len_ratio_lo,
            len_ratio_hi: config.len_ratio_hi,
            top_k: config.search_top_k,
        }
    }

    /// Find the best canonical match for the candidates. `variants` are
    /// every available text rendition (fused Gurmukhi plus per-engine
    /// conversions); the strongest candidate's text is the primary.
    pub fn find_match(
        &self,
        candidates: &[QuoteCandidate],
        variants: &[String],
    ) -> Result<Option<QuoteMatch>> {
        let Some(primary) = candidates.iter().max_by(|a, b| {
            a.detection_confidence
                .partial_cmp(&b.detection_confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) else {
            return Ok(None);
        };

        let mut search_texts: Vec<&str> = vec![primary.text.as_str()];
        for variant in variants {
            if !variant.trim().is_empty() && !search_texts.contains(&variant.as_str()) {
                search_texts.push(variant.as_str());
            }
        }

        // Stage A: fuzzy retrieval across all variants.
        let retrieved = self.stage_a_fuzzy(&search_texts);
        if retrieved.is_empty() {
            debug!("stage A produced no retrieval hits");
            return Ok(None);
        }

        // Stage B: semantic verification and score combination.
        let mut scored: Vec<(ScriptureLine, f32, f32, f32)> = Vec::new();
        for (line, fuzzy) in retrieved {
            let semantic = self.stage_b_semantic(&search_texts, &line)?;
            let combined = self.fuzzy_weight * fuzzy + self.semantic_weight * semantic;
            scored.push((line, combined, fuzzy, semantic));
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        // Stage C: verifier rules, best surviving pair wins.
        for (line, combined, fuzzy, semantic) in scored {
            if self.stage_c_verify(&primary.text, &line, combined) {
                info!(
                    line_id = %line.line_id,
                    combined,
                    fuzzy,
                    semantic,
                    "quote match verified"
                );
                return Ok(Some(QuoteMatch::from_line(&line, combined, fuzzy, semantic)));
            }
        }

        debug!("no retrieval hit survived the verifier");
        Ok(None)
    }

    /// Union of index hits across variants, best fuzzy score per line.
    fn stage_a_fuzzy(&self, search_texts: &[&str]) -> Vec<(ScriptureLine, f32)> {
        let mut best: HashMap<String, (ScriptureLine, f32)> = HashMap::new();

        for text in search_texts {
            let normalized = normalize_gurmukhi_query(text);
            if normalized.is_empty() {
                continue;
            }
            for hit in self.index.search_by_text(text, self.top_k) {
                let fuzzy = strsim::normalized_levenshtein(
                    &normalized,
                    &normalize_gurmukhi_query(&hit.line.gurmukhi),
                ) as f32;
                let fuzzy = fuzzy.max(hit.score);
                best.entry(hit.line.line_id.clone())
                    .and_modify(|entry| {
                        if fuzzy > entry.1 {
                            entry.1 = fuzzy;
                        }
                    })
                    .or_insert((hit.line, fuzzy));
            }
        }

        let mut retrieved: Vec<(ScriptureLine, f32)> = best.into_values().collect();
        retrieved.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        retrieved.truncate(self.top_k);
        retrieved
    }

    /// Best semantic score across variants for one line.
    fn stage_b_semantic(&self, search_texts: &[&str], line: &ScriptureLine) -> Result<f32> {
        let mut best = 0.0f32;
        for text in search_texts {
            let score = self.scorer.score(text, &line.gurmukhi)?;
            best = best.max(score);
        }
        Ok(best)
    }

    /// Stage C rules: all must pass.
    fn stage_c_verify(&self, spoken: &str, line: &ScriptureLine, combined: f32) -> bool {
        if combined < self.verifier_floor {
            return false;
        }

        let spoken_tokens = tokenize(spoken);
        let canonical_tokens = tokenize(&line.gurmukhi);
        if spoken_tokens.is_empty() || canonical_tokens.is_empty() {
            return false;
        }

        let ratio = spoken_tokens.len() as f32 / canonical_tokens.len() as f32;
        if ratio < self.len_ratio_lo || ratio > self.len_ratio_hi {
            debug!(ratio, "token-count ratio outside bounds");
            return false;
        }

        let spoken_content: HashSet<&str> = content_tokens(&spoken_tokens).into_iter().collect();
        let canonical_content: HashSet<&str> =
            content_tokens(&canonical_tokens).into_iter().collect();
        if spoken_content.intersection(&canonical_content).next().is_none() {
            debug!("no distinctive content token in common");
            return false;
        }

        true
    }
}
