//! Pluggable denoise filters.
//!
//! The DSP itself is a collaborator behind [`DenoiseFilter`]; the
//! pipeline only owns invocation and toggling. The in-tree filters are a
//! passthrough and a simple spectral gate; learned backends implement
//! the trait out of tree.

use tracing::debug;

use katha_config::{DenoiseBackend, DenoiseConfig, DenoiseStrength};

use crate::vad::rms;

/// A denoise backend applied to the whole decoded buffer before
/// chunking (batch) or to pushed frames (live).
pub trait DenoiseFilter: Send + Sync {
    fn apply(&self, samples: &[i16]) -> Vec<i16>;

    fn name(&self) -> &'static str;
}

/// No-op filter used when denoising is disabled.
#[derive(Debug, Clone, Default)]
pub struct PassthroughDenoiser;

impl DenoiseFilter for PassthroughDenoiser {
    fn apply(&self, samples: &[i16]) -> Vec<i16> {
        samples.to_vec()
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Frame-level noise gate: frames whose level sits near the estimated
/// noise floor are attenuated. Crude next to a learned denoiser, but
/// deterministic and dependency-free.
#[derive(Debug, Clone)]
pub struct SpectralGateDenoiser {
    /// Multiplier over the noise floor below which a frame is gated.
    gate_ratio: f32,
    /// Gain applied to gated frames.
    attenuation: f32,
    frame_len: usize,
}

impl SpectralGateDenoiser {
    pub fn new(strength: DenoiseStrength) -> Self {
        let (gate_ratio, attenuation) = match strength {
            DenoiseStrength::Light => (1.5, 0.5),
            DenoiseStrength::Medium => (2.0, 0.25),
            DenoiseStrength::Aggressive => (3.0, 0.1),
        };
        Self {
            gate_ratio,
            attenuation,
            frame_len: 480, // 30 ms at 16 kHz
        }
    }

    /// Noise floor estimate: the 10th-percentile frame level.
    fn noise_floor(&self, samples: &[i16]) -> f32 {
        let mut levels: Vec<f32> = samples
            .chunks(self.frame_len)
            .map(rms)
            .filter(|&l| l > 0.0)
            .collect();
        if levels.is_empty() {
            return 0.0;
        }
        levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        levels[levels.len() / 10]
    }
}

impl DenoiseFilter for SpectralGateDenoiser {
    fn apply(&self, samples: &[i16]) -> Vec<i16> {
        let floor = self.noise_floor(samples);
        if floor == 0.0 {
            return samples.to_vec();
        }
        let gate = floor * self.gate_ratio;
        debug!(noise_floor = floor, gate, "applying spectral gate");

        let mut out = Vec::with_capacity(samples.len());
        for frame in samples.chunks(self.frame_len) {
            if rms(frame) < gate {
                out.extend(
                    frame
                        .iter()
                        .map(|&s| (s as f32 * self.attenuation) as i16),
                );
            } else {
                out.extend_from_slice(frame);
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "spectral_gate"
    }
}

/// Build the configured filter, or `None` when denoising is disabled.
/// Learned backends are external; asking for one here falls back to the
/// spectral gate with a warning.
pub fn build_denoiser(config: &DenoiseConfig) -> Option<Box<dyn DenoiseFilter>> {
    if !config.enabled {
        return None;
    }
    match config.backend {
        DenoiseBackend::Spectral => Some(Box::new(SpectralGateDenoiser::new(config.strength))),
        DenoiseBackend::Learned1 | DenoiseBackend::Learned2 => {
            tracing::warn!(
                backend = ?config.backend,
                "learned denoise backend not registered; using spectral gate"
            );
            Some(Box::new(SpectralGateDenoiser::new(config.strength)))
        }
    }
}
