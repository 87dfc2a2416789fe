//! ASR hypotheses and the outcome of fusing them.

use serde::{Deserialize, Serialize};

/// Logical engine role. Priority for vote tie-breaking is A > B > C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineId {
    /// Large multilingual model, always run.
    General,
    /// Indic-tuned model, run for Punjabi / scripture / mixed routes.
    Indic,
    /// English-tuned model, run for English / mixed routes.
    English,
}

impl EngineId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineId::General => "asr_a_general",
            EngineId::Indic => "asr_b_indic",
            EngineId::English => "asr_c_english",
        }
    }

    /// Lower value wins ties. General beats Indic beats English.
    pub fn priority(&self) -> u8 {
        match self {
            EngineId::General => 0,
            EngineId::Indic => 1,
            EngineId::English => 2,
        }
    }
}

/// Word-level timing from an engine. Optional: engines without word
/// alignment leave the list empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_sec: f64,
    pub end_sec: f64,
    pub confidence: f32,
}

/// One engine's output for one chunk. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub engine_id: EngineId,
    pub text: String,
    /// ISO 639-1 code the engine decoded with (or detected).
    pub language: String,
    /// Segment-level confidence in [0, 1].
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub word_timings: Vec<WordTiming>,
    /// Set when the engine failed or timed out; the hypothesis then carries
    /// empty text and zero confidence so fusion can ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_error: Option<String>,
}

impl Hypothesis {
    pub fn new(
        engine_id: EngineId,
        text: impl Into<String>,
        language: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            engine_id,
            text: text.into(),
            language: language.into(),
            confidence: confidence.clamp(0.0, 1.0),
            word_timings: Vec::new(),
            engine_error: None,
        }
    }

    /// The degraded hypothesis an engine contributes on failure.
    pub fn engine_error(engine_id: EngineId, reason: impl Into<String>) -> Self {
        Self {
            engine_id,
            text: String::new(),
            language: "unknown".to_string(),
            confidence: 0.0,
            word_timings: Vec::new(),
            engine_error: Some(reason.into()),
        }
    }

    pub fn with_word_timings(mut self, timings: Vec<WordTiming>) -> Self {
        self.word_timings = timings;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.engine_error.is_some()
    }
}

/// Result of combining the hypotheses for one chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionOutcome {
    pub fused_text: String,
    pub fused_confidence: f32,
    /// Mean pairwise similarity between usable hypotheses. 1.0 by
    /// convention for a single hypothesis.
    pub agreement_score: f32,
    /// Every hypothesis retained verbatim for audit.
    pub hypotheses: Vec<Hypothesis>,
    /// True when the re-decode policy should fire (and has not yet).
    pub needs_redecode: bool,
    /// How many re-decode passes have already run.
    pub redecode_attempts: u32,
    /// Engine whose text dominated the vote.
    pub selected_engine: EngineId,
    /// Language carried forward to script conversion.
    pub language: String,
}

impl FusionOutcome {
    /// Hypotheses that actually produced text (failures excluded).
    pub fn usable_hypotheses(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hypotheses.iter().filter(|h| !h.is_failed())
    }
}
