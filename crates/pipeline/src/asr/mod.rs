//! ASR engines behind a uniform trait.
//!
//! Three logical roles share the interface: A (general, always run),
//! B (indic-tuned), C (english-tuned). Model-backed engines implement
//! [`AsrEngine`] out of tree; the in-tree engines are the deterministic
//! [`ScriptedEngine`] for tests and offline fixtures and the degraded
//! [`NullEngine`].

mod prompt;
mod scripted;

pub use prompt::gurbani_prompt;
pub use scripted::{ScriptedEngine, ScriptedUtterance};

use std::sync::Arc;

use async_trait::async_trait;

use katha_config::AsrConfig;
use katha_core::{AudioChunk, EngineId, Hypothesis, Result, Route};

/// Decoding parameters for one transcription call.
#[derive(Debug, Clone, Default)]
pub struct DecodeParams {
    /// ISO 639-1 hint; engines may ignore it only if they perform
    /// equally well without.
    pub language_hint: Option<String>,
    /// Beam width; the re-decode pass widens this.
    pub beam_size: u32,
    /// Vocabulary-bias prompt for domain decoding.
    pub initial_prompt: Option<String>,
}

impl DecodeParams {
    pub fn for_route(route: Route, config: &AsrConfig) -> Self {
        Self {
            language_hint: route.language_hint().map(str::to_string),
            beam_size: config.beam_size,
            initial_prompt: if config.gurbani_prompting {
                gurbani_prompt(config.domain_mode)
            } else {
                None
            },
        }
    }

    pub fn with_language_hint(mut self, hint: Option<&str>) -> Self {
        self.language_hint = hint.map(str::to_string);
        self
    }

    pub fn with_beam_size(mut self, beam_size: u32) -> Self {
        self.beam_size = beam_size;
        self
    }
}

/// A speech-to-text engine for single chunks. Implementations must be
/// deterministic given the same inputs and model state; heavy engines
/// serialize internally (one chunk at a time per instance).
#[async_trait]
pub trait AsrEngine: Send + Sync {
    fn id(&self) -> EngineId;

    /// Transcribe one chunk. On internal failure an implementation may
    /// either return the error or a degraded empty hypothesis; the
    /// orchestrator converts errors into empty hypotheses with an
    /// engine_error reason.
    async fn transcribe(&self, chunk: &AudioChunk, params: &DecodeParams) -> Result<Hypothesis>;
}

/// An engine that always degrades: empty text, zero confidence, with an
/// engine_error reason. Stands in for unloadable models.
pub struct NullEngine {
    id: EngineId,
    reason: String,
}

impl NullEngine {
    pub fn new(id: EngineId, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AsrEngine for NullEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    async fn transcribe(&self, _chunk: &AudioChunk, _params: &DecodeParams) -> Result<Hypothesis> {
        Ok(Hypothesis::engine_error(self.id, self.reason.clone()))
    }
}

/// The registered engines for the three roles. B and C are optional;
/// routes that want them simply fan out to fewer engines.
pub struct EngineSet {
    pub general: Arc<dyn AsrEngine>,
    pub indic: Option<Arc<dyn AsrEngine>>,
    pub english: Option<Arc<dyn AsrEngine>>,
}

impl EngineSet {
    pub fn new(
        general: Arc<dyn AsrEngine>,
        indic: Option<Arc<dyn AsrEngine>>,
        english: Option<Arc<dyn AsrEngine>>,
    ) -> Self {
        Self {
            general,
            indic,
            english,
        }
    }

    /// Additional engines (beyond A) warranted by the route.
    pub fn additional_for_route(&self, route: Route) -> Vec<Arc<dyn AsrEngine>> {
        let mut engines: Vec<Arc<dyn AsrEngine>> = Vec::new();
        let want_indic = matches!(
            route,
            Route::Punjabi | Route::ScriptureQuoteLikely | Route::Mixed
        );
        let want_english = matches!(route, Route::English | Route::Mixed);

        if want_indic {
            if let Some(indic) = &self.indic {
                engines.push(Arc::clone(indic));
            }
        }
        if want_english {
            if let Some(english) = &self.english {
                engines.push(Arc::clone(english));
            }
        }
        engines
    }
}
