//! Enumerated option types.

use serde::{Deserialize, Serialize};

/// Size of the general-purpose (engine A) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WhisperModelSize {
    Tiny,
    Base,
    #[default]
    Small,
    Medium,
    Large,
}

impl WhisperModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModelSize::Tiny => "tiny",
            WhisperModelSize::Base => "base",
            WhisperModelSize::Small => "small",
            WhisperModelSize::Medium => "medium",
            WhisperModelSize::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tiny" => Some(WhisperModelSize::Tiny),
            "base" => Some(WhisperModelSize::Base),
            "small" => Some(WhisperModelSize::Small),
            "medium" => Some(WhisperModelSize::Medium),
            // large-v2 / large-v3 collapse to the large tier
            s if s.starts_with("large") => Some(WhisperModelSize::Large),
            _ => None,
        }
    }
}

/// Domain bias for vocabulary and quote detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DomainMode {
    /// Sri Guru Granth Sahib Ji (Sant Bhasha, Braj, old Punjabi).
    #[default]
    Sggs,
    /// Dasam Granth (Braj and Sanskrit heavy).
    Dasam,
    /// Modern Punjabi, no scripture bias.
    Generic,
}

impl DomainMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sggs" => Some(DomainMode::Sggs),
            "dasam" => Some(DomainMode::Dasam),
            "generic" => Some(DomainMode::Generic),
            _ => None,
        }
    }
}

/// Romanization scheme for the Gurmukhi → Roman transliterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RomanScheme {
    /// Academic ISO 15919.
    Iso15919,
    /// Sanskrit-based IAST.
    Iast,
    /// Simplified letter forms for general readers.
    #[default]
    Practical,
}

impl RomanScheme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "iso15919" | "iso_15919" => Some(RomanScheme::Iso15919),
            "iast" => Some(RomanScheme::Iast),
            "practical" => Some(RomanScheme::Practical),
            _ => None,
        }
    }
}

/// Denoise backend selection (the DSP itself is a pluggable filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseBackend {
    #[default]
    Spectral,
    Learned1,
    Learned2,
}

/// How hard the denoiser works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseStrength {
    Light,
    #[default]
    Medium,
    Aggressive,
}

impl DenoiseStrength {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(DenoiseStrength::Light),
            "medium" => Some(DenoiseStrength::Medium),
            "aggressive" => Some(DenoiseStrength::Aggressive),
            _ => None,
        }
    }
}
