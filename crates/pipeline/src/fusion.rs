//! Hypothesis fusion.
//!
//! Combines 1–3 hypotheses for a chunk into one fused text plus a
//! confidence, and decides whether a re-decode pass is warranted.
//!
//! - Align: NFC + whitespace tokenization, token-level edit alignment.
//! - Vote: per aligned position, majority token; ties break by engine
//!   priority (A > B > C) then per-engine confidence.
//! - Agreement: mean pairwise normalized similarity (1.0 for a single
//!   hypothesis by convention).
//! - Confidence: `mean(conf) * (0.5 + 0.5 * agreement)`.

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use katha_config::FusionConfig;
use katha_core::{EngineId, FusionOutcome, Hypothesis, Result, Route};

/// Token similarity at or above this counts as an aligned match during
/// voting.
const TOKEN_MATCH_FLOOR: f64 = 0.5;

/// Confidence above which two opposite-language hypotheses signal mixed
/// content rather than a decoding dispute.
const MIXED_CONTENT_CONFIDENCE: f32 = 0.75;

pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse the hypotheses for one chunk. An empty list is a
    /// [`katha_core::Error::Fusion`]; hypotheses with empty text (engine
    /// degradations) are retained for audit but excluded from the vote.
    pub fn fuse(&self, hypotheses: Vec<Hypothesis>, route: Route) -> Result<FusionOutcome> {
        if hypotheses.is_empty() {
            return Err(katha_core::Error::Fusion(
                "no hypotheses for chunk".to_string(),
            ));
        }

        let usable: Vec<&Hypothesis> = hypotheses.iter().filter(|h| !h.is_empty()).collect();

        if usable.is_empty() {
            // Every engine degraded; emit an empty outcome the
            // orchestrator will flag for review.
            return Ok(FusionOutcome {
                fused_text: String::new(),
                fused_confidence: 0.0,
                agreement_score: 0.0,
                needs_redecode: self.config.max_redecode_attempts > 0,
                redecode_attempts: 0,
                selected_engine: EngineId::General,
                language: "unknown".to_string(),
                hypotheses,
            });
        }

        if usable.len() == 1 {
            let only = usable[0];
            let outcome = FusionOutcome {
                fused_text: normalize_text(&only.text),
                fused_confidence: only.confidence,
                agreement_score: 1.0,
                needs_redecode: only.confidence < self.config.redecode_floor,
                redecode_attempts: 0,
                selected_engine: only.engine_id,
                language: only.language.clone(),
                hypotheses,
            };
            return Ok(outcome);
        }

        // Mixed-content edge: two hypotheses in opposite languages, both
        // confident. Prefer the one matching the route; fall back to A.
        if let Some(selected) = self.mixed_language_pick(&usable, route) {
            let agreement = mean_pairwise_similarity(&usable);
            let mean_conf =
                usable.iter().map(|h| h.confidence).sum::<f32>() / usable.len() as f32;
            let fused_confidence = mean_conf * (0.5 + 0.5 * agreement);
            return Ok(FusionOutcome {
                fused_text: normalize_text(&selected.text),
                fused_confidence,
                agreement_score: agreement,
                needs_redecode: fused_confidence < self.config.redecode_floor,
                redecode_attempts: 0,
                selected_engine: selected.engine_id,
                language: selected.language.clone(),
                hypotheses: hypotheses.clone(),
            });
        }

        let agreement = mean_pairwise_similarity(&usable);
        let reference = select_reference(&usable);
        let fused_text = vote_tokens(reference, &usable);

        let mean_conf = usable.iter().map(|h| h.confidence).sum::<f32>() / usable.len() as f32;
        let fused_confidence = (mean_conf * (0.5 + 0.5 * agreement)).clamp(0.0, 1.0);

        debug!(
            agreement,
            fused_confidence,
            selected = reference.engine_id.as_str(),
            "fused hypotheses"
        );

        Ok(FusionOutcome {
            fused_text,
            fused_confidence,
            agreement_score: agreement,
            needs_redecode: fused_confidence < self.config.redecode_floor,
            redecode_attempts: 0,
            selected_engine: reference.engine_id,
            language: reference.language.clone(),
            hypotheses,
        })
    }

    /// Whether the re-decode policy should fire for this outcome.
    pub fn should_redecode(&self, outcome: &FusionOutcome) -> bool {
        if outcome.redecode_attempts >= self.config.max_redecode_attempts {
            return false;
        }
        outcome.fused_confidence < self.config.redecode_floor
            || outcome.agreement_score < self.config.agreement_floor
    }

    /// Fold a re-decode hypothesis in and keep the better outcome.
    pub fn apply_redecode(
        &self,
        previous: FusionOutcome,
        redecoded: Hypothesis,
        route: Route,
    ) -> FusionOutcome {
        let mut all = previous.hypotheses.clone();
        all.push(redecoded);

        let mut refused = match self.fuse(all, route) {
            Ok(outcome) => outcome,
            Err(_) => previous.clone(),
        };
        refused.redecode_attempts = previous.redecode_attempts + 1;

        if refused.fused_confidence >= previous.fused_confidence {
            refused
        } else {
            // The second pass was worse; keep the original text but
            // record that the attempt happened.
            let mut kept = previous;
            kept.redecode_attempts += 1;
            kept.needs_redecode = false;
            kept
        }
    }

    /// Review policy: low confidence or low agreement.
    pub fn needs_review(&self, outcome: &FusionOutcome) -> bool {
        outcome.fused_confidence < self.config.review_floor
            || outcome.agreement_score < self.config.agreement_floor
    }

    fn mixed_language_pick<'a>(
        &self,
        usable: &[&'a Hypothesis],
        route: Route,
    ) -> Option<&'a Hypothesis> {
        if usable.len() != 2 {
            return None;
        }
        let (a, b) = (usable[0], usable[1]);
        let opposite = language_group(&a.language) != language_group(&b.language);
        let both_confident = a.confidence >= MIXED_CONTENT_CONFIDENCE
            && b.confidence >= MIXED_CONTENT_CONFIDENCE;
        if !opposite || !both_confident {
            return None;
        }

        let route_group = route.language_hint().map(language_group);
        if let Some(group) = route_group {
            if let Some(matching) = usable
                .iter()
                .find(|h| language_group(&h.language) == group)
                .copied()
            {
                return Some(matching);
            }
        }
        usable
            .iter()
            .find(|h| h.engine_id == EngineId::General)
            .copied()
            .or(Some(a))
    }
}

/// Indic vs Latin language grouping for the mixed-content rule.
fn language_group(code: &str) -> u8 {
    match code {
        "pa" | "ur" | "hi" => 0,
        "en" => 1,
        _ => 2,
    }
}

/// NFC + whitespace collapse.
fn normalize_text(text: &str) -> String {
    let nfc: String = text.nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokens_of(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Mean pairwise normalized edit similarity over usable hypotheses.
fn mean_pairwise_similarity(usable: &[&Hypothesis]) -> f32 {
    if usable.len() < 2 {
        return 1.0;
    }

    let normalized: Vec<String> = usable.iter().map(|h| normalize_text(&h.text)).collect();
    let mut total = 0.0f64;
    let mut pairs = 0usize;
    for i in 0..normalized.len() {
        for j in (i + 1)..normalized.len() {
            total += strsim::normalized_levenshtein(&normalized[i], &normalized[j]);
            pairs += 1;
        }
    }
    (total / pairs as f64) as f32
}

/// Reference hypothesis for voting: highest mean similarity to the
/// others, ties by engine priority then confidence.
fn select_reference<'a>(usable: &[&'a Hypothesis]) -> &'a Hypothesis {
    let normalized: Vec<String> = usable.iter().map(|h| normalize_text(&h.text)).collect();

    let mut best_idx = 0usize;
    let mut best_key = (f64::MIN, i32::MIN, f32::MIN);
    for i in 0..usable.len() {
        let mut sim_sum = 0.0f64;
        for j in 0..usable.len() {
            if i != j {
                sim_sum += strsim::normalized_levenshtein(&normalized[i], &normalized[j]);
            }
        }
        let key = (
            sim_sum,
            -(usable[i].engine_id.priority() as i32),
            usable[i].confidence,
        );
        if key > best_key {
            best_key = key;
            best_idx = i;
        }
    }
    usable[best_idx]
}

/// Majority vote over tokens aligned to the reference.
fn vote_tokens(reference: &Hypothesis, usable: &[&Hypothesis]) -> String {
    let ref_tokens = tokens_of(&reference.text);
    if ref_tokens.is_empty() {
        return String::new();
    }

    // For each reference position, the aligned token (if any) per
    // hypothesis.
    let mut columns: Vec<Vec<(&Hypothesis, String)>> = vec![Vec::new(); ref_tokens.len()];

    for hyp in usable {
        let tokens = tokens_of(&hyp.text);
        if std::ptr::eq(*hyp, reference) {
            for (i, token) in ref_tokens.iter().enumerate() {
                columns[i].push((reference, token.clone()));
            }
            continue;
        }
        let mapping = align_tokens(&ref_tokens, &tokens);
        for (i, aligned) in mapping.into_iter().enumerate() {
            if let Some(j) = aligned {
                columns[i].push((*hyp, tokens[j].clone()));
            }
        }
    }

    let voted: Vec<String> = columns
        .into_iter()
        .map(|column| {
            // Count votes per distinct token.
            let mut tally: Vec<(String, usize, u8, f32)> = Vec::new();
            for (hyp, token) in &column {
                match tally.iter_mut().find(|(t, ..)| t == token) {
                    Some(entry) => {
                        entry.1 += 1;
                        entry.2 = entry.2.min(hyp.engine_id.priority());
                        entry.3 = entry.3.max(hyp.confidence);
                    }
                    None => tally.push((
                        token.clone(),
                        1,
                        hyp.engine_id.priority(),
                        hyp.confidence,
                    )),
                }
            }
            tally
                .into_iter()
                .max_by(|a, b| {
                    a.1.cmp(&b.1)
                        .then(b.2.cmp(&a.2)) // lower priority value wins
                        .then(a.3.partial_cmp(&b.3).unwrap_or(std::cmp::Ordering::Equal))
                })
                .map(|(token, ..)| token)
                .unwrap_or_default()
        })
        .filter(|t| !t.is_empty())
        .collect();

    voted.join(" ")
}

/// Token-level alignment of `other` onto `reference` via edit-distance
/// dynamic programming. Returns, per reference index, the aligned index
/// in `other` (substitutions with similarity below the floor still
/// align; insertions/deletions do not).
fn align_tokens(reference: &[String], other: &[String]) -> Vec<Option<usize>> {
    let n = reference.len();
    let m = other.len();
    if n == 0 || m == 0 {
        return vec![None; n];
    }

    // Costs: gap 1.0, substitution (1 - similarity).
    let gap = 1.0f64;
    let mut dp = vec![vec![0.0f64; m + 1]; n + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i as f64 * gap;
    }
    for j in 0..=m {
        dp[0][j] = j as f64 * gap;
    }

    for i in 1..=n {
        for j in 1..=m {
            let sub = 1.0 - strsim::normalized_levenshtein(&reference[i - 1], &other[j - 1]);
            dp[i][j] = (dp[i - 1][j - 1] + sub)
                .min(dp[i - 1][j] + gap)
                .min(dp[i][j - 1] + gap);
        }
    }

    // Backtrace.
    let mut mapping = vec![None; n];
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        let sub = 1.0 - strsim::normalized_levenshtein(&reference[i - 1], &other[j - 1]);
        if (dp[i][j] - (dp[i - 1][j - 1] + sub)).abs() < 1e-9 {
            if sub <= 1.0 - TOKEN_MATCH_FLOOR {
                mapping[i - 1] = Some(j - 1);
            }
            i -= 1;
            j -= 1;
        } else if (dp[i][j] - (dp[i - 1][j] + gap)).abs() < 1e-9 {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    mapping
}
