//! Voice-activity chunking.
//!
//! Batch mode walks a decoded sample buffer and yields a lazy,
//! non-restartable sequence of chunks. Live mode accumulates pushed
//! frames and flushes on silence or at the duration ceiling.
//!
//! Emission rules, per frame while speech is active:
//! 1. at `max_chunk_sec`, forcibly;
//! 2. at `target_chunk_sec`, at the next opportunity;
//! 3. at the first non-speech boundary after `min_chunk_sec`;
//! 4. a non-speech gap longer than `gap_close_ms` closes the segment
//!    (emitting only if `min_chunk_sec` was reached).
//!
//! Consecutive chunks overlap by `overlap_sec`: the tail of the emitted
//! chunk seeds the head of the next.

use tracing::debug;

use katha_config::ChunkerConfig;
use katha_core::audio::PIPELINE_SAMPLE_RATE;
use katha_core::{AudioChunk, SourceMode};

use crate::vad::{EnergyVad, VadEngine};

pub struct Chunker {
    config: ChunkerConfig,
    vad: Box<dyn VadEngine>,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        let vad = Box::new(EnergyVad::new(config.vad_aggressiveness));
        Self { config, vad }
    }

    pub fn with_vad(config: ChunkerConfig, vad: Box<dyn VadEngine>) -> Self {
        Self { config, vad }
    }

    /// Lazily chunk a decoded buffer. Empty audio yields zero chunks.
    pub fn chunks<'a>(&'a self, job_id: &str, samples: &'a [i16]) -> ChunkIter<'a> {
        ChunkIter {
            config: &self.config,
            vad: self.vad.as_ref(),
            job_id: job_id.to_string(),
            samples,
            frame_len: frame_len(&self.config),
            cursor: 0,
            state: SegmentState::new(),
            next_index: 0,
        }
    }
}

fn frame_len(config: &ChunkerConfig) -> usize {
    (PIPELINE_SAMPLE_RATE as usize * config.frame_ms as usize) / 1000
}

/// Accumulation state for the segment being built.
struct SegmentState {
    buffer: Vec<i16>,
    /// Timeline position of the first sample in `buffer`, seconds.
    start_sec: f64,
    /// Milliseconds of speech accumulated in the buffer. Trailing
    /// silence pads the buffer but never counts toward emission rules.
    speech_ms: u32,
    /// Milliseconds of trailing non-speech inside the buffer.
    silence_run_ms: u32,
    active: bool,
    /// Tail of the previously emitted chunk, seeds the next head.
    overlap: Vec<i16>,
    overlap_start_sec: f64,
}

impl SegmentState {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            start_sec: 0.0,
            speech_ms: 0,
            silence_run_ms: 0,
            active: false,
            overlap: Vec::new(),
            overlap_start_sec: 0.0,
        }
    }

    fn buffer_sec(&self) -> f64 {
        self.buffer.len() as f64 / PIPELINE_SAMPLE_RATE as f64
    }

    fn speech_sec(&self) -> f64 {
        self.speech_ms as f64 / 1000.0
    }

    fn begin(&mut self, at_sec: f64) {
        self.active = true;
        self.speech_ms = 0;
        self.silence_run_ms = 0;
        if self.overlap.is_empty() {
            self.start_sec = at_sec;
        } else {
            // Seed with the prior chunk's tail for boundary continuity.
            self.start_sec = self.overlap_start_sec;
            self.buffer = std::mem::take(&mut self.overlap);
        }
    }

    fn take_chunk(
        &mut self,
        job_id: &str,
        index: u64,
        overlap_sec: f64,
        mode: SourceMode,
    ) -> AudioChunk {
        let end_sec = self.start_sec + self.buffer_sec();
        let samples = std::mem::take(&mut self.buffer);

        // Keep the tail as the next chunk's head overlap.
        let overlap_samples = (overlap_sec * PIPELINE_SAMPLE_RATE as f64) as usize;
        if overlap_samples > 0 && samples.len() > overlap_samples {
            self.overlap = samples[samples.len() - overlap_samples..].to_vec();
            self.overlap_start_sec = end_sec - overlap_sec;
        } else {
            self.overlap.clear();
        }

        self.speech_ms = 0;
        self.silence_run_ms = 0;
        self.active = false;
        AudioChunk::new(job_id, index, self.start_sec, end_sec, samples, mode)
    }

    fn discard(&mut self) {
        self.buffer.clear();
        self.overlap.clear();
        self.speech_ms = 0;
        self.silence_run_ms = 0;
        self.active = false;
    }
}

/// Lazy chunk iterator over a batch buffer. Non-restartable.
pub struct ChunkIter<'a> {
    config: &'a ChunkerConfig,
    vad: &'a dyn VadEngine,
    job_id: String,
    samples: &'a [i16],
    frame_len: usize,
    cursor: usize,
    state: SegmentState,
    next_index: u64,
}

impl ChunkIter<'_> {
    fn emit(&mut self) -> AudioChunk {
        let chunk = self.state.take_chunk(
            &self.job_id,
            self.next_index,
            self.config.overlap_sec,
            SourceMode::Batch,
        );
        self.next_index += 1;
        debug!(
            chunk_index = chunk.chunk_index,
            start = chunk.start_sec,
            end = chunk.end_sec,
            "emitted chunk"
        );
        chunk
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = AudioChunk;

    fn next(&mut self) -> Option<AudioChunk> {
        loop {
            if self.cursor + self.frame_len > self.samples.len() {
                // Tail flush: whatever speech is left, if long enough.
                if self.state.active && self.state.speech_sec() >= self.config.min_chunk_sec {
                    return Some(self.emit());
                }
                return None;
            }

            let frame = &self.samples[self.cursor..self.cursor + self.frame_len];
            let frame_start_sec = self.cursor as f64 / PIPELINE_SAMPLE_RATE as f64;
            self.cursor += self.frame_len;

            let is_speech = self.vad.is_speech(frame);

            if !self.state.active {
                if is_speech {
                    self.state.begin(frame_start_sec);
                    self.state.buffer.extend_from_slice(frame);
                }
                continue;
            }

            self.state.buffer.extend_from_slice(frame);
            if is_speech {
                self.state.speech_ms += self.config.frame_ms;
                self.state.silence_run_ms = 0;
            } else {
                self.state.silence_run_ms += self.config.frame_ms;
            }

            if self.state.buffer_sec() >= self.config.max_chunk_sec {
                return Some(self.emit());
            }
            if self.state.speech_sec() >= self.config.target_chunk_sec {
                return Some(self.emit());
            }
            if !is_speech && self.state.speech_sec() >= self.config.min_chunk_sec {
                return Some(self.emit());
            }
            if self.state.silence_run_ms > self.config.gap_close_ms {
                // Gap closed a too-short segment; drop it.
                self.state.discard();
            }
        }
    }
}

/// Incremental chunker for live sessions. Frames arrive from outside;
/// chunks flush on silence or at the duration ceiling.
pub struct LiveChunker {
    config: ChunkerConfig,
    vad: Box<dyn VadEngine>,
    job_id: String,
    state: SegmentState,
    /// Timeline position of the next pushed sample, seconds.
    position_sec: f64,
    silence_since_speech_ms: u32,
    next_index: u64,
}

impl LiveChunker {
    pub fn new(config: ChunkerConfig, job_id: impl Into<String>) -> Self {
        let vad = Box::new(EnergyVad::new(config.vad_aggressiveness));
        Self {
            config,
            vad,
            job_id: job_id.into(),
            state: SegmentState::new(),
            position_sec: 0.0,
            silence_since_speech_ms: 0,
            next_index: 0,
        }
    }

    /// Push captured frames; returns any chunks that became ready.
    pub fn push(&mut self, samples: &[i16]) -> Vec<AudioChunk> {
        let frame_len = frame_len(&self.config);
        let mut ready = Vec::new();

        for frame in samples.chunks(frame_len) {
            let frame_sec = frame.len() as f64 / PIPELINE_SAMPLE_RATE as f64;
            let frame_start = self.position_sec;
            self.position_sec += frame_sec;

            let is_speech = self.vad.is_speech(frame);

            if !self.state.active {
                if is_speech {
                    self.state.begin(frame_start);
                    self.state.buffer.extend_from_slice(frame);
                    self.silence_since_speech_ms = 0;
                }
                continue;
            }

            self.state.buffer.extend_from_slice(frame);
            if is_speech {
                self.silence_since_speech_ms = 0;
            } else {
                self.silence_since_speech_ms += self.config.frame_ms;
            }

            let flush = self.state.buffer_sec() >= self.config.max_chunk_sec
                || self.silence_since_speech_ms >= self.config.live_flush_ms;

            if flush {
                ready.push(self.take_chunk());
            }
        }

        ready
    }

    /// Flush the partial chunk at session end.
    pub fn flush(&mut self) -> Option<AudioChunk> {
        if self.state.active && !self.state.buffer.is_empty() {
            Some(self.take_chunk())
        } else {
            None
        }
    }

    fn take_chunk(&mut self) -> AudioChunk {
        let chunk = self.state.take_chunk(
            &self.job_id,
            self.next_index,
            self.config.overlap_sec,
            SourceMode::Live,
        );
        self.next_index += 1;
        self.silence_since_speech_ms = 0;
        chunk
    }
}
