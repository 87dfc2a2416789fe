//! Audio pipeline for the katha transcription engine.
//!
//! This crate provides the runtime pipeline:
//! - Audio decode (WAV, resampled to 16 kHz mono PCM16)
//! - Voice-activity chunking (batch and live)
//! - Language/domain routing
//! - Multi-engine ASR fan-out behind a uniform trait
//! - Hypothesis fusion with a re-decode policy
//! - The orchestrator driving batch files and live sessions

pub mod asr;
pub mod chunker;
pub mod decode;
pub mod denoise;
pub mod fusion;
pub mod orchestrator;
pub mod router;
pub mod vad;

pub use asr::{AsrEngine, DecodeParams, EngineSet, NullEngine, ScriptedEngine};
pub use chunker::{Chunker, LiveChunker};
pub use denoise::{DenoiseFilter, PassthroughDenoiser, SpectralGateDenoiser};
pub use fusion::FusionEngine;
pub use orchestrator::{
    JobHandle, JobOptions, LiveCallbacks, LiveSession, Orchestrator, PipelineEvent,
    SegmentCallback,
};
pub use router::Router;
pub use vad::{EnergyVad, VadEngine};

use thiserror::Error;

/// Pipeline-internal errors; converted into the core taxonomy at the
/// orchestrator boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("audio decode failed for {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("engine {engine} timed out after {seconds:.1}s")]
    EngineTimeout { engine: String, seconds: f64 },

    #[error("session closed")]
    SessionClosed,
}

impl From<PipelineError> for katha_core::Error {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::Decode { path, reason } => katha_core::Error::AudioDecode {
                path: path.clone(),
                reason: reason.clone(),
            },
            PipelineError::UnsupportedFormat(reason) => katha_core::Error::AudioDecode {
                path: String::new(),
                reason: reason.clone(),
            },
            PipelineError::EngineTimeout { engine, .. } => katha_core::Error::AsrEngine {
                engine: engine.clone(),
                reason: err.to_string(),
            },
            PipelineError::SessionClosed => {
                katha_core::Error::Fusion("live session already closed".to_string())
            }
        }
    }
}
