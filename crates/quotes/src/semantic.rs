//! Semantic scoring between a candidate and a canonical line.
//!
//! The default scorer is word-level overlap on content tokens. An
//! embedding-backed scorer can replace it by implementing the trait; the
//! matcher treats scorer failures as per-candidate faults, never job
//! failures.

use std::collections::HashSet;

use katha_scripture::tokenize;

use crate::stoplist::content_tokens;

/// Scores semantic similarity between candidate and canonical text.
pub trait SemanticScorer: Send + Sync {
    fn score(&self, candidate: &str, canonical: &str) -> katha_core::Result<f32>;
}

/// Content-token overlap scorer: `|c ∩ l| / max(|c|, |l|)` after
/// stoplist filtering.
#[derive(Debug, Clone, Default)]
pub struct TokenOverlapScorer;

impl SemanticScorer for TokenOverlapScorer {
    fn score(&self, candidate: &str, canonical: &str) -> katha_core::Result<f32> {
        let candidate_tokens = tokenize(candidate);
        let canonical_tokens = tokenize(canonical);

        let candidate_content: HashSet<&str> =
            content_tokens(&candidate_tokens).into_iter().collect();
        let canonical_content: HashSet<&str> =
            content_tokens(&canonical_tokens).into_iter().collect();

        if candidate_content.is_empty() || canonical_content.is_empty() {
            return Ok(0.0);
        }

        let overlap = candidate_content.intersection(&canonical_content).count();
        let denominator = candidate_content.len().max(canonical_content.len());
        Ok(overlap as f32 / denominator as f32)
    }
}
