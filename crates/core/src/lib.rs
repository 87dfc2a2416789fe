//! Core types for the katha transcription engine.
//!
//! This crate provides the data model shared by every other crate:
//! - Audio chunks and routing decisions
//! - ASR hypotheses and fusion outcomes
//! - Script conversion results
//! - Scripture lines and quote matches
//! - Processed segments and the final transcript
//! - The error taxonomy

pub mod audio;
pub mod error;
pub mod hypothesis;
pub mod quote;
pub mod route;
pub mod scripture;
pub mod transcript;

pub use audio::{AudioChunk, SourceMode};
pub use error::{Error, Result};
pub use hypothesis::{EngineId, FusionOutcome, Hypothesis, WordTiming};
pub use quote::{QuoteCandidate, QuoteMatch};
pub use route::{Route, RouteDecision};
pub use scripture::{ScriptureLine, ScriptureSource};
pub use transcript::{
    ConvertedText, DetectedScript, ProcessedSegment, SegmentKind, TranscriptMetrics,
    TranscriptResult,
};
