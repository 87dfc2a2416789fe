//! Audio chunk types produced by the chunker and consumed by ASR.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Sample rate every pipeline stage expects, in Hz.
pub const PIPELINE_SAMPLE_RATE: u32 = 16_000;

/// Whether a chunk came from a batch file or a live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Batch,
    Live,
}

/// A bounded window of mono 16 kHz PCM16 audio belonging to a job.
///
/// Chunks are created by the chunker and never mutated afterwards; the
/// sample buffer is shared so fan-out to multiple ASR engines is cheap.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Job this chunk belongs to.
    pub job_id: String,
    /// Monotonically increasing index within the job.
    pub chunk_index: u64,
    /// Start offset in the source audio, seconds.
    pub start_sec: f64,
    /// End offset in the source audio, seconds. Always > `start_sec`.
    pub end_sec: f64,
    /// Raw samples, mono PCM16 at [`PIPELINE_SAMPLE_RATE`].
    pub samples: Arc<[i16]>,
    /// Where the chunk came from.
    pub source_mode: SourceMode,
}

impl AudioChunk {
    pub fn new(
        job_id: impl Into<String>,
        chunk_index: u64,
        start_sec: f64,
        end_sec: f64,
        samples: Vec<i16>,
        source_mode: SourceMode,
    ) -> Self {
        debug_assert!(end_sec > start_sec, "chunk must cover a positive time range");
        Self {
            job_id: job_id.into(),
            chunk_index,
            start_sec,
            end_sec,
            samples: samples.into(),
            source_mode,
        }
    }

    /// Duration covered by this chunk, seconds.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Duration implied by the sample count, seconds.
    pub fn sample_duration_sec(&self) -> f64 {
        self.samples.len() as f64 / PIPELINE_SAMPLE_RATE as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
