//! Error taxonomy for the transcription pipeline.
//!
//! Messages are fix-oriented: each fatal error tells the operator what to
//! change. Per-chunk errors are captured into segments by the orchestrator
//! and never propagate out of the chunk loop.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Cannot decode the input audio bytes. Fatal for the job.
    #[error(
        "failed to decode audio file {path}: {reason}\n\
         Fix: ensure the file is valid 16-bit PCM WAV (convert with ffmpeg if needed)"
    )]
    AudioDecode { path: String, reason: String },

    /// Scripture index missing or unreadable at startup. Fatal for the
    /// process; mid-job unavailability only degrades quote matching.
    #[error(
        "scripture database not found or unreadable: {path}: {reason}\n\
         Fix: download the scripture database and place it at {path}, \
         or point SCRIPTURE_DB_PATH at it"
    )]
    ScriptureUnavailable { path: String, reason: String },

    /// Engine crash or timeout. Per-chunk recoverable: the engine
    /// contributes an empty hypothesis instead.
    #[error(
        "ASR engine '{engine}' failed: {reason}\n\
         Fix: check that the {engine} model is loaded and healthy"
    )]
    AsrEngine { engine: String, reason: String },

    /// Zero hypotheses for a chunk. Per-chunk recoverable: an empty
    /// segment with needs_review is emitted.
    #[error(
        "ASR fusion failed: {0}\n\
         Fix: check that at least one ASR engine produced a result"
    )]
    Fusion(String),

    /// Unrecoverable failure inside the converter. Per-chunk recoverable:
    /// text passes through as-is and the segment is flagged for review.
    #[error(
        "script conversion failed ({source_script} -> gurmukhi): {reason}\n\
         Fix: check the input text for unsupported characters"
    )]
    ScriptConversion {
        source_script: String,
        reason: String,
    },

    /// Index query failed mid-match. Per-candidate recoverable: the
    /// candidate is dropped and the segment flagged for review.
    #[error(
        "quote matching failed: {0}\n\
         Fix: check that the scripture index is reachable"
    )]
    QuoteMatch(String),

    /// Contradictory or missing configuration. Fatal at startup.
    #[error(
        "invalid configuration: {0}\n\
         Fix: correct the named setting in config/default.yaml or the environment"
    )]
    Config(String),
}

impl Error {
    /// Whether this error aborts the whole job (as opposed to degrading a
    /// single chunk or candidate).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AudioDecode { .. } | Error::ScriptureUnavailable { .. } | Error::Config(_)
        )
    }
}
