//! Deterministic fixture engine.
//!
//! Maps chunk indices to scripted utterances. Tests and offline fixture
//! runs drive the whole pipeline with it; it honors the engine contract
//! (deterministic, hint-aware, optional simulated latency and failures).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use katha_core::{AudioChunk, EngineId, Hypothesis, Result};

use super::{AsrEngine, DecodeParams};

/// One scripted response for a chunk index.
#[derive(Debug, Clone)]
pub struct ScriptedUtterance {
    pub text: String,
    pub language: String,
    pub confidence: f32,
    /// Text returned instead when decoding with a widened beam; models
    /// a re-decode pass that recovers a better hypothesis.
    pub redecode_text: Option<String>,
    pub redecode_confidence: f32,
}

impl ScriptedUtterance {
    pub fn new(text: impl Into<String>, language: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            confidence,
            redecode_text: None,
            redecode_confidence: 0.0,
        }
    }

    pub fn with_redecode(mut self, text: impl Into<String>, confidence: f32) -> Self {
        self.redecode_text = Some(text.into());
        self.redecode_confidence = confidence;
        self
    }
}

/// Fixture-driven engine. Unscripted chunks yield an empty hypothesis.
pub struct ScriptedEngine {
    id: EngineId,
    utterances: HashMap<u64, ScriptedUtterance>,
    base_beam_size: u32,
    latency: Duration,
    fail_always: bool,
}

impl ScriptedEngine {
    pub fn new(id: EngineId) -> Self {
        Self {
            id,
            utterances: HashMap::new(),
            base_beam_size: 5,
            latency: Duration::ZERO,
            fail_always: false,
        }
    }

    pub fn with_utterance(mut self, chunk_index: u64, utterance: ScriptedUtterance) -> Self {
        self.utterances.insert(chunk_index, utterance);
        self
    }

    /// Beam width at or below which the primary text is returned;
    /// anything wider returns the re-decode text when scripted.
    pub fn with_base_beam_size(mut self, beam_size: u32) -> Self {
        self.base_beam_size = beam_size;
        self
    }

    /// Simulated decode latency, for timeout tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Always fail, for degradation tests.
    pub fn failing(mut self) -> Self {
        self.fail_always = true;
        self
    }
}

#[async_trait]
impl AsrEngine for ScriptedEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    async fn transcribe(&self, chunk: &AudioChunk, params: &DecodeParams) -> Result<Hypothesis> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_always {
            return Err(katha_core::Error::AsrEngine {
                engine: self.id.as_str().to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let Some(utterance) = self.utterances.get(&chunk.chunk_index) else {
            return Ok(Hypothesis::new(self.id, "", "unknown", 0.0));
        };

        let widened = params.beam_size > self.base_beam_size;
        let (text, confidence) = match (&utterance.redecode_text, widened) {
            (Some(redecode), true) => (redecode.clone(), utterance.redecode_confidence),
            _ => (utterance.text.clone(), utterance.confidence),
        };

        Ok(Hypothesis::new(self.id, text, utterance.language.clone(), confidence))
    }
}
