//! Per-stage configuration structs with serde defaults.

use serde::{Deserialize, Serialize};

use crate::types::{DenoiseBackend, DenoiseStrength, DomainMode, RomanScheme, WhisperModelSize};

fn default_true() -> bool {
    true
}

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Pipeline sample rate in Hz. Inputs are resampled to this.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    16_000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

/// Voice-activity chunker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Minimum chunk duration in seconds.
    #[serde(default = "default_min_chunk_sec")]
    pub min_chunk_sec: f64,

    /// Preferred chunk duration in seconds.
    #[serde(default = "default_target_chunk_sec")]
    pub target_chunk_sec: f64,

    /// Hard ceiling on chunk duration in seconds.
    #[serde(default = "default_max_chunk_sec")]
    pub max_chunk_sec: f64,

    /// Overlap between consecutive chunks in seconds.
    #[serde(default = "default_overlap_sec")]
    pub overlap_sec: f64,

    /// VAD aggressiveness, 0 (permissive) to 3 (strict).
    #[serde(default = "default_vad_aggressiveness")]
    pub vad_aggressiveness: u8,

    /// VAD frame length in milliseconds (10, 20, or 30).
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,

    /// Non-speech gap that closes a speech segment, milliseconds.
    #[serde(default = "default_gap_close_ms")]
    pub gap_close_ms: u32,

    /// Live mode: silence duration after which a partial chunk flushes.
    #[serde(default = "default_live_flush_ms")]
    pub live_flush_ms: u32,
}

fn default_min_chunk_sec() -> f64 {
    1.0
}
fn default_target_chunk_sec() -> f64 {
    10.0
}
fn default_max_chunk_sec() -> f64 {
    30.0
}
fn default_overlap_sec() -> f64 {
    0.5
}
fn default_vad_aggressiveness() -> u8 {
    2
}
fn default_frame_ms() -> u32 {
    30
}
fn default_gap_close_ms() -> u32 {
    300
}
fn default_live_flush_ms() -> u32 {
    800
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_chunk_sec: default_min_chunk_sec(),
            target_chunk_sec: default_target_chunk_sec(),
            max_chunk_sec: default_max_chunk_sec(),
            overlap_sec: default_overlap_sec(),
            vad_aggressiveness: default_vad_aggressiveness(),
            frame_ms: default_frame_ms(),
            gap_close_ms: default_gap_close_ms(),
            live_flush_ms: default_live_flush_ms(),
        }
    }
}

/// Language/domain router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Classifier confidence required to commit to a language route.
    #[serde(default = "default_langid_floor")]
    pub langid_floor: f32,

    /// Two languages within this delta of each other route as `mixed`.
    #[serde(default = "default_langid_tie_delta")]
    pub langid_tie_delta: f32,

    /// Chunks shorter than this with a scripture cue route as
    /// scripture-quote-likely.
    #[serde(default = "default_scripture_short_sec")]
    pub scripture_short_sec: f64,

    /// Cue phrases that signal an incoming quotation ("as the bani says").
    #[serde(default = "default_scripture_cues")]
    pub scripture_cues: Vec<String>,
}

fn default_langid_floor() -> f32 {
    0.6
}
fn default_langid_tie_delta() -> f32 {
    0.15
}
fn default_scripture_short_sec() -> f64 {
    15.0
}
fn default_scripture_cues() -> Vec<String> {
    vec![
        "ਬਾਣੀ ਚ ਕਿਹਾ".to_string(),
        "ਗੁਰਬਾਣੀ ਫੁਰਮਾਉਂਦੀ".to_string(),
        "ਗੁਰੂ ਸਾਹਿਬ ਫੁਰਮਾਉਂਦੇ".to_string(),
        "ਜਿਵੇਂ ਕਿਹਾ ਹੈ".to_string(),
        "ਬਾਣੀ ਚ ਆਇਆ".to_string(),
    ]
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            langid_floor: default_langid_floor(),
            langid_tie_delta: default_langid_tie_delta(),
            scripture_short_sec: default_scripture_short_sec(),
            scripture_cues: default_scripture_cues(),
        }
    }
}

/// ASR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrConfig {
    /// Model tier for the general engine (A).
    #[serde(default)]
    pub whisper_model_size: WhisperModelSize,

    /// Domain bias for decoding prompts and quote detection.
    #[serde(default)]
    pub domain_mode: DomainMode,

    /// Bound on concurrent ASR engine invocations.
    #[serde(default = "default_asr_parallel_workers")]
    pub asr_parallel_workers: usize,

    /// Bound on chunks processed simultaneously.
    #[serde(default = "default_chunk_parallel_workers")]
    pub chunk_parallel_workers: usize,

    /// Per-chunk engine timeout as a multiple of the chunk duration.
    #[serde(default = "default_timeout_realtime_factor")]
    pub timeout_realtime_factor: f64,

    /// Decoder beam width for normal passes.
    #[serde(default = "default_beam_size")]
    pub beam_size: u32,

    /// Beam multiplier applied on the re-decode pass.
    #[serde(default = "default_redecode_beam_multiplier")]
    pub redecode_beam_multiplier: f32,

    /// Bias decoding toward Gurbani vocabulary when the domain allows.
    #[serde(default = "default_true")]
    pub gurbani_prompting: bool,
}

fn default_asr_parallel_workers() -> usize {
    2
}
fn default_chunk_parallel_workers() -> usize {
    2
}
fn default_timeout_realtime_factor() -> f64 {
    4.0
}
fn default_beam_size() -> u32 {
    5
}
fn default_redecode_beam_multiplier() -> f32 {
    2.0
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            whisper_model_size: WhisperModelSize::default(),
            domain_mode: DomainMode::default(),
            asr_parallel_workers: default_asr_parallel_workers(),
            chunk_parallel_workers: default_chunk_parallel_workers(),
            timeout_realtime_factor: default_timeout_realtime_factor(),
            beam_size: default_beam_size(),
            redecode_beam_multiplier: default_redecode_beam_multiplier(),
            gurbani_prompting: true,
        }
    }
}

/// Hypothesis fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Fused confidence below this triggers the re-decode policy.
    #[serde(default = "default_redecode_floor")]
    pub redecode_floor: f32,

    /// Fused confidence below this flags the segment for review.
    #[serde(default = "default_review_floor")]
    pub review_floor: f32,

    /// Agreement below this flags the segment for review.
    #[serde(default = "default_agreement_floor")]
    pub agreement_floor: f32,

    /// Maximum re-decode passes per chunk.
    #[serde(default = "default_max_redecode_attempts")]
    pub max_redecode_attempts: u32,
}

fn default_redecode_floor() -> f32 {
    0.6
}
fn default_review_floor() -> f32 {
    0.7
}
fn default_agreement_floor() -> f32 {
    0.6
}
fn default_max_redecode_attempts() -> u32 {
    2
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            redecode_floor: default_redecode_floor(),
            review_floor: default_review_floor(),
            agreement_floor: default_agreement_floor(),
            max_redecode_attempts: default_max_redecode_attempts(),
        }
    }
}

/// Script conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Romanization scheme.
    #[serde(default)]
    pub romanization_scheme: RomanScheme,

    /// Unicode normalization form: NFC, NFD, NFKC, or NFKD.
    #[serde(default = "default_unicode_form")]
    pub unicode_form: String,

    /// Whole-word lexicon lookup before character rules.
    #[serde(default = "default_true")]
    pub dictionary_lookup: bool,

    /// Conversion confidence below this flags the segment for review.
    #[serde(default = "default_script_review_floor")]
    pub script_review_floor: f32,

    /// Two scripts within this share of each other detect as `mixed`.
    #[serde(default = "default_script_mix_delta")]
    pub script_mix_delta: f32,

    /// Flag segments whose post-conversion Gurmukhi purity is low.
    #[serde(default)]
    pub strict_gurmukhi: bool,

    /// Minimum share of Gurmukhi codepoints under strict mode.
    #[serde(default = "default_script_purity_floor")]
    pub script_purity_floor: f32,

    /// Capitalize word-initial letters in the practical scheme.
    #[serde(default)]
    pub capitalize_roman: bool,
}

fn default_unicode_form() -> String {
    "NFC".to_string()
}
fn default_script_review_floor() -> f32 {
    0.7
}
fn default_script_mix_delta() -> f32 {
    0.2
}
fn default_script_purity_floor() -> f32 {
    0.95
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            romanization_scheme: RomanScheme::default(),
            unicode_form: default_unicode_form(),
            dictionary_lookup: true,
            script_review_floor: default_script_review_floor(),
            script_mix_delta: default_script_mix_delta(),
            strict_gurmukhi: false,
            script_purity_floor: default_script_purity_floor(),
            capitalize_roman: false,
        }
    }
}

/// Quote detection, matching, and replacement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Matches at or above this replace the text automatically.
    #[serde(default = "default_auto_replace_floor")]
    pub auto_replace_floor: f32,

    /// Matches in [review_floor, auto_replace_floor) attach as suggestions.
    #[serde(default = "default_quote_review_floor")]
    pub review_floor: f32,

    /// Stage C verifier: minimum combined score to survive.
    #[serde(default = "default_verifier_floor")]
    pub verifier_floor: f32,

    /// Weight of the fuzzy score in the combined score.
    #[serde(default = "default_fuzzy_weight")]
    pub fuzzy_weight: f32,

    /// Weight of the semantic score in the combined score.
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f32,

    /// Share of tokens in scripture vocabulary that fires the density signal.
    #[serde(default = "default_vocab_ratio_floor")]
    pub vocab_ratio_floor: f32,

    /// Spoken/canonical token-count ratio bounds for the verifier.
    #[serde(default = "default_len_ratio_lo")]
    pub len_ratio_lo: f32,
    #[serde(default = "default_len_ratio_hi")]
    pub len_ratio_hi: f32,

    /// Candidate word-count window for the archaic-structure signal.
    #[serde(default = "default_quote_min_words")]
    pub quote_min_words: usize,
    #[serde(default = "default_quote_max_words")]
    pub quote_max_words: usize,

    /// Lines fetched from the index per fuzzy retrieval.
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    /// Shabad context lines attached to an accepted match, per side.
    #[serde(default = "default_context_radius")]
    pub context_radius: u32,

    /// Ordered cue patterns (regex) that introduce a quotation.
    #[serde(default = "default_cue_patterns")]
    pub cue_patterns: Vec<String>,
}

fn default_auto_replace_floor() -> f32 {
    0.90
}
fn default_quote_review_floor() -> f32 {
    0.70
}
fn default_verifier_floor() -> f32 {
    0.60
}
fn default_fuzzy_weight() -> f32 {
    0.6
}
fn default_semantic_weight() -> f32 {
    0.4
}
fn default_vocab_ratio_floor() -> f32 {
    0.3
}
fn default_len_ratio_lo() -> f32 {
    0.5
}
fn default_len_ratio_hi() -> f32 {
    2.0
}
fn default_quote_min_words() -> usize {
    3
}
fn default_quote_max_words() -> usize {
    30
}
fn default_search_top_k() -> usize {
    20
}
fn default_context_radius() -> u32 {
    2
}
fn default_cue_patterns() -> Vec<String> {
    vec![
        r"ਜਿਵੇਂ\s+ਬਾਣੀ\s+ਚ\s+ਕਿਹਾ".to_string(),
        r"ਗੁਰਬਾਣੀ\s+ਫੁਰਮਾਉਂਦੀ".to_string(),
        r"ਬਾਣੀ\s+ਚ\s+ਕਿਹਾ".to_string(),
        r"ਗੁਰੂ\s+ਸਾਹਿਬ\s+ਫੁਰਮਾਉਂਦੇ".to_string(),
        r"ਅੰਗ\s+\d+\s+ਚ".to_string(),
        r"ਜਿਵੇਂ\s+ਕਿਹਾ\s+ਹੈ".to_string(),
        r"ਬਾਣੀ\s+ਚ\s+ਆਇਆ".to_string(),
    ]
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            auto_replace_floor: default_auto_replace_floor(),
            review_floor: default_quote_review_floor(),
            verifier_floor: default_verifier_floor(),
            fuzzy_weight: default_fuzzy_weight(),
            semantic_weight: default_semantic_weight(),
            vocab_ratio_floor: default_vocab_ratio_floor(),
            len_ratio_lo: default_len_ratio_lo(),
            len_ratio_hi: default_len_ratio_hi(),
            quote_min_words: default_quote_min_words(),
            quote_max_words: default_quote_max_words(),
            search_top_k: default_search_top_k(),
            context_radius: default_context_radius(),
            cue_patterns: default_cue_patterns(),
        }
    }
}

/// Live streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Unstarted chunks beyond this depth drop the oldest with a loss event.
    #[serde(default = "default_live_queue_depth")]
    pub queue_depth: usize,
}

fn default_live_queue_depth() -> usize {
    8
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            queue_depth: default_live_queue_depth(),
        }
    }
}

/// Denoise filter configuration. The DSP backend is pluggable; only
/// invocation and toggling belong to the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenoiseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub backend: DenoiseBackend,
    #[serde(default)]
    pub strength: DenoiseStrength,
}

/// Scripture database locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptureConfig {
    /// Primary corpus (SGGS). Missing file is fatal at startup.
    #[serde(default = "default_sggs_path")]
    pub sggs_path: String,

    /// Secondary corpus (Dasam Granth). Optional.
    #[serde(default)]
    pub dasam_path: Option<String>,
}

fn default_sggs_path() -> String {
    "data/sggs.sqlite".to_string()
}

impl Default for ScriptureConfig {
    fn default() -> Self {
        Self {
            sggs_path: default_sggs_path(),
            dasam_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fusion_defaults_match_documented_thresholds() {
        let fusion = FusionConfig::default();
        assert_eq!(fusion.redecode_floor, 0.6);
        assert_eq!(fusion.review_floor, 0.7);
        assert_eq!(fusion.agreement_floor, 0.6);
    }

    #[test]
    fn test_quote_weights_sum_to_one() {
        let quotes = QuoteConfig::default();
        assert!((quotes.fuzzy_weight + quotes.semantic_weight - 1.0).abs() < 1e-6);
        assert_eq!(quotes.auto_replace_floor, 0.90);
    }

    #[test]
    fn test_chunker_defaults_ordered() {
        let chunker = ChunkerConfig::default();
        assert!(chunker.min_chunk_sec < chunker.target_chunk_sec);
        assert!(chunker.target_chunk_sec < chunker.max_chunk_sec);
    }
}
