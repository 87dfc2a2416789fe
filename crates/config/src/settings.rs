//! Top-level settings: layering, legacy env overrides, validation.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::stages::{
    AsrConfig, AudioConfig, ChunkerConfig, DenoiseConfig, FusionConfig, LiveConfig,
    ObservabilityConfig, QuoteConfig, RouterConfig, ScriptConfig, ScriptureConfig,
};
use crate::types::{DenoiseStrength, DomainMode, RomanScheme, WhisperModelSize};
use crate::ConfigError;

/// Complete engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub chunker: ChunkerConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub asr: AsrConfig,

    #[serde(default)]
    pub fusion: FusionConfig,

    #[serde(default)]
    pub script: ScriptConfig,

    #[serde(default)]
    pub quotes: QuoteConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub denoise: DenoiseConfig,

    #[serde(default)]
    pub scripture: ScriptureConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the settings tree. Contradictory values are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit(field: &str, value: f32) -> Result<(), ConfigError> {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("must be within [0, 1], got {value}"),
                });
            }
            Ok(())
        }

        unit("fusion.redecode_floor", self.fusion.redecode_floor)?;
        unit("fusion.review_floor", self.fusion.review_floor)?;
        unit("fusion.agreement_floor", self.fusion.agreement_floor)?;
        unit("quotes.auto_replace_floor", self.quotes.auto_replace_floor)?;
        unit("quotes.review_floor", self.quotes.review_floor)?;
        unit("quotes.verifier_floor", self.quotes.verifier_floor)?;
        unit("quotes.vocab_ratio_floor", self.quotes.vocab_ratio_floor)?;
        unit("script.script_review_floor", self.script.script_review_floor)?;
        unit("script.script_purity_floor", self.script.script_purity_floor)?;
        unit("router.langid_floor", self.router.langid_floor)?;

        if (self.quotes.fuzzy_weight + self.quotes.semantic_weight - 1.0).abs() > 1e-4 {
            return Err(ConfigError::InvalidValue {
                field: "quotes.fuzzy_weight".to_string(),
                message: format!(
                    "fuzzy_weight ({}) + semantic_weight ({}) must equal 1.0",
                    self.quotes.fuzzy_weight, self.quotes.semantic_weight
                ),
            });
        }

        if self.quotes.review_floor > self.quotes.auto_replace_floor {
            return Err(ConfigError::InvalidValue {
                field: "quotes.review_floor".to_string(),
                message: "review_floor must not exceed auto_replace_floor".to_string(),
            });
        }

        if self.quotes.len_ratio_lo >= self.quotes.len_ratio_hi {
            return Err(ConfigError::InvalidValue {
                field: "quotes.len_ratio_lo".to_string(),
                message: "len_ratio_lo must be below len_ratio_hi".to_string(),
            });
        }

        if self.chunker.min_chunk_sec <= 0.0
            || self.chunker.min_chunk_sec > self.chunker.max_chunk_sec
        {
            return Err(ConfigError::InvalidValue {
                field: "chunker.min_chunk_sec".to_string(),
                message: "must be positive and below max_chunk_sec".to_string(),
            });
        }

        if self.chunker.target_chunk_sec < self.chunker.min_chunk_sec
            || self.chunker.target_chunk_sec > self.chunker.max_chunk_sec
        {
            return Err(ConfigError::InvalidValue {
                field: "chunker.target_chunk_sec".to_string(),
                message: "must lie within [min_chunk_sec, max_chunk_sec]".to_string(),
            });
        }

        if self.chunker.vad_aggressiveness > 3 {
            return Err(ConfigError::InvalidValue {
                field: "chunker.vad_aggressiveness".to_string(),
                message: "must be 0, 1, 2, or 3".to_string(),
            });
        }

        if !matches!(self.chunker.frame_ms, 10 | 20 | 30) {
            return Err(ConfigError::InvalidValue {
                field: "chunker.frame_ms".to_string(),
                message: "must be 10, 20, or 30".to_string(),
            });
        }

        if self.asr.asr_parallel_workers == 0 || self.asr.chunk_parallel_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "asr.asr_parallel_workers".to_string(),
                message: "worker bounds must be at least 1".to_string(),
            });
        }

        if !matches!(self.script.unicode_form.as_str(), "NFC" | "NFD" | "NFKC" | "NFKD") {
            return Err(ConfigError::InvalidValue {
                field: "script.unicode_form".to_string(),
                message: format!(
                    "must be NFC, NFD, NFKC, or NFKD, got '{}'",
                    self.script.unicode_form
                ),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest): legacy flat env vars, `KATHA__`-prefixed
/// env vars, `config/{env}.yaml`, `config/default.yaml`, built-ins.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("KATHA")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    apply_legacy_env(&mut settings);
    settings.validate()?;

    Ok(settings)
}

/// Flat environment variables kept for compatibility with existing
/// deployments; they win over every file-based source.
fn apply_legacy_env(settings: &mut Settings) {
    if let Ok(value) = std::env::var("WHISPER_MODEL_SIZE") {
        match WhisperModelSize::parse(&value) {
            Some(size) => settings.asr.whisper_model_size = size,
            None => tracing::warn!("ignoring unrecognized WHISPER_MODEL_SIZE='{value}'"),
        }
    }
    if let Ok(value) = std::env::var("DOMAIN_MODE") {
        match DomainMode::parse(&value) {
            Some(mode) => settings.asr.domain_mode = mode,
            None => tracing::warn!("ignoring unrecognized DOMAIN_MODE='{value}'"),
        }
    }
    if let Ok(value) = std::env::var("STRICT_GURMUKHI") {
        settings.script.strict_gurmukhi = value.eq_ignore_ascii_case("true");
    }
    if let Ok(value) = std::env::var("ROMAN_TRANSLITERATION_SCHEME") {
        if let Some(scheme) = RomanScheme::parse(&value) {
            settings.script.romanization_scheme = scheme;
        }
    }
    if let Ok(value) = std::env::var("QUOTE_MATCH_CONFIDENCE_THRESHOLD") {
        match value.parse::<f32>() {
            Ok(threshold) => settings.quotes.auto_replace_floor = threshold,
            Err(_) => tracing::warn!("ignoring non-numeric QUOTE_MATCH_CONFIDENCE_THRESHOLD"),
        }
    }
    if let Ok(value) = std::env::var("ENABLE_DENOISING") {
        settings.denoise.enabled = value.eq_ignore_ascii_case("true");
    }
    if let Ok(value) = std::env::var("DENOISE_STRENGTH") {
        if let Some(strength) = DenoiseStrength::parse(&value) {
            settings.denoise.strength = strength;
        }
    }
    if let Ok(value) = std::env::var("ASR_PARALLEL_WORKERS") {
        if let Ok(workers) = value.parse::<usize>() {
            settings.asr.asr_parallel_workers = workers;
        }
    }
    if let Ok(value) = std::env::var("SCRIPTURE_DB_PATH") {
        settings.scripture.sggs_path = value;
    }
    if let Ok(value) = std::env::var("DASAM_DB_PATH") {
        settings.scripture.dasam_path = Some(value);
    }
    if let Ok(value) = std::env::var("LOG_LEVEL") {
        settings.observability.log_level = value.to_lowercase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut settings = Settings::default();
        settings.quotes.fuzzy_weight = 0.8;
        settings.quotes.semantic_weight = 0.4;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_chunk_bounds_checked() {
        let mut settings = Settings::default();
        settings.chunker.min_chunk_sec = 40.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.chunker.target_chunk_sec = 0.2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_vad_aggressiveness_range() {
        let mut settings = Settings::default();
        settings.chunker.vad_aggressiveness = 4;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_threshold_range_checked() {
        let mut settings = Settings::default();
        settings.fusion.redecode_floor = 1.2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unicode_form_checked() {
        let mut settings = Settings::default();
        settings.script.unicode_form = "NFX".to_string();
        assert!(settings.validate().is_err());
    }
}
