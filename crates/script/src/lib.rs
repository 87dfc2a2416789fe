//! Script layer: detection, Shahmukhi → Gurmukhi conversion, Gurmukhi
//! diacritic normalization, and romanization.
//!
//! ASR engines emit whatever script their training data favored; Punjabi
//! speech frequently comes back in Shahmukhi (Arabic script). This crate
//! turns any of those into a normalized Gurmukhi rendition plus a Roman
//! transliteration, with a confidence that feeds the review policy.

pub mod chars;
pub mod converter;
pub mod detect;
pub mod mappings;
pub mod normalize;
pub mod roman;
pub mod shahmukhi;

pub use converter::ScriptConverter;
pub use detect::ScriptDetector;
pub use normalize::GurmukhiNormalizer;
pub use roman::Romanizer;
pub use shahmukhi::ShahmukhiConverter;

use thiserror::Error;

/// Script layer errors.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("unsupported unicode normalization form: {0}")]
    UnsupportedUnicodeForm(String),
}

impl From<ScriptError> for katha_core::Error {
    fn from(err: ScriptError) -> Self {
        katha_core::Error::ScriptConversion {
            source_script: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}
