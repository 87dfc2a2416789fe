//! Configuration for the katha transcription engine.
//!
//! Settings are layered, highest priority first:
//! 1. Legacy flat environment variables (`WHISPER_MODEL_SIZE`, `DOMAIN_MODE`, …)
//! 2. `KATHA__`-prefixed environment variables (`KATHA__FUSION__REDECODE_FLOOR=0.5`)
//! 3. `config/{env}.yaml` when an environment name is given
//! 4. `config/default.yaml`
//! 5. Built-in defaults

pub mod logging;
pub mod settings;
pub mod stages;
pub mod types;

pub use logging::init_tracing;
pub use settings::{load_settings, Settings};
pub use stages::{
    AsrConfig, AudioConfig, ChunkerConfig, DenoiseConfig, FusionConfig, LiveConfig,
    ObservabilityConfig, QuoteConfig, RouterConfig, ScriptConfig, ScriptureConfig,
};
pub use types::{DenoiseBackend, DenoiseStrength, DomainMode, RomanScheme, WhisperModelSize};

use thiserror::Error;

/// Configuration errors. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl From<ConfigError> for katha_core::Error {
    fn from(err: ConfigError) -> Self {
        katha_core::Error::Config(err.to_string())
    }
}
