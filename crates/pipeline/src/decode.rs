//! WAV decoding and resampling to the pipeline format.
//!
//! Everything downstream expects mono 16 kHz PCM16. Multi-channel input
//! is downmixed by averaging; other sample rates go through a linear
//! resampler. Undecodable input is fatal for the job.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use tracing::info;

use katha_core::audio::PIPELINE_SAMPLE_RATE;

use crate::PipelineError;

/// Decoded audio ready for the chunker.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub source_sample_rate: u32,
    pub duration_sec: f64,
}

/// Decode a WAV file to mono 16 kHz PCM16.
pub fn load_wav(path: &Path) -> Result<DecodedAudio, PipelineError> {
    let mut reader = WavReader::open(path).map_err(|e| PipelineError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(PipelineError::Decode {
            path: path.display().to_string(),
            reason: "zero channels".to_string(),
        });
    }

    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> 16) as i16))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
        (format, bits) => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "{format:?} {bits}-bit; expected 16/32-bit int or 32-bit float WAV"
            )));
        }
    };

    let mono = downmix(&interleaved, channels);
    let samples = resample_linear(&mono, spec.sample_rate, PIPELINE_SAMPLE_RATE);
    let duration_sec = samples.len() as f64 / PIPELINE_SAMPLE_RATE as f64;

    info!(
        path = %path.display(),
        source_rate = spec.sample_rate,
        channels,
        duration_sec,
        "decoded audio"
    );

    Ok(DecodedAudio {
        samples,
        source_sample_rate: spec.sample_rate,
        duration_sec,
    })
}

/// Average interleaved channels down to mono.
fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampler. Adequate for speech; a band-limited
/// resampler can replace it behind the same signature.
fn resample_linear(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos.floor() as usize;
        let frac = pos - idx as f64;
        let a = samples[idx] as f64;
        let b = samples[(idx + 1).min(samples.len() - 1)] as f64;
        out.push((a + (b - a) * frac).round() as i16);
    }

    out
}
