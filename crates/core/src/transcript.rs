//! Converted text, processed segments, and the final transcript.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hypothesis::Hypothesis;
use crate::quote::QuoteMatch;
use crate::route::RouteDecision;

/// Script detected on a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedScript {
    Gurmukhi,
    Shahmukhi,
    Devanagari,
    Latin,
    Mixed,
    Empty,
    Unknown,
}

impl DetectedScript {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedScript::Gurmukhi => "gurmukhi",
            DetectedScript::Shahmukhi => "shahmukhi",
            DetectedScript::Devanagari => "devanagari",
            DetectedScript::Latin => "latin",
            DetectedScript::Mixed => "mixed",
            DetectedScript::Empty => "empty",
            DetectedScript::Unknown => "unknown",
        }
    }
}

/// Dual-script output of the converter for one text. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedText {
    pub original_text: String,
    pub original_script: DetectedScript,
    pub gurmukhi: String,
    pub roman: String,
    pub conversion_confidence: f32,
    pub needs_review: bool,
}

impl ConvertedText {
    /// Result for empty input: empty outputs with full confidence.
    pub fn empty(original: impl Into<String>) -> Self {
        Self {
            original_text: original.into(),
            original_script: DetectedScript::Empty,
            gurmukhi: String::new(),
            roman: String::new(),
            conversion_confidence: 1.0,
            needs_review: false,
        }
    }

    /// Pass-through result used when conversion fails unrecoverably; the
    /// text survives as-is and the segment is flagged for review.
    pub fn passthrough(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            gurmukhi: original.clone(),
            roman: String::new(),
            original_text: original,
            original_script: DetectedScript::Unknown,
            conversion_confidence: 0.0,
            needs_review: true,
        }
    }
}

/// Kind of a processed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Speech,
    ScriptureQuote,
}

/// The terminal per-chunk record. Appended to the transcript in
/// `chunk_index` order and never rewritten afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedSegment {
    /// Stable id shared by draft and verified events in live mode.
    pub segment_id: String,
    pub chunk_index: u64,
    #[serde(rename = "start")]
    pub start_sec: f64,
    #[serde(rename = "end")]
    pub end_sec: f64,
    pub kind: SegmentKind,
    /// Original pre-replacement text. Provenance is mandatory: canonical
    /// replacement never overwrites this.
    pub spoken_text: String,
    pub gurmukhi: String,
    pub roman: String,
    pub language: String,
    /// Script the fused text arrived in before conversion.
    pub original_script: DetectedScript,
    pub route: RouteDecision,
    pub asr_confidence: f32,
    pub script_confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_match: Option<QuoteMatch>,
    pub needs_review: bool,
    pub per_engine_hypotheses: Vec<Hypothesis>,
    /// Per-chunk faults captured instead of propagated, plus quote
    /// detection notes kept for audit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ProcessedSegment {
    pub fn new_segment_id() -> String {
        format!("seg_{}", Uuid::new_v4().simple())
    }

    pub fn is_quote(&self) -> bool {
        self.kind == SegmentKind::ScriptureQuote
    }
}

/// Aggregate counters and per-stage latency for a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptMetrics {
    pub chunk_count: u64,
    pub segments_emitted: u64,
    pub quote_candidates: u64,
    pub quotes_detected: u64,
    pub quotes_replaced: u64,
    pub segments_needing_review: u64,
    pub redecode_passes: u64,
    pub chunks_dropped: u64,
    /// Wall-clock totals per stage, milliseconds.
    pub chunking_ms: u64,
    pub asr_ms: u64,
    pub fusion_ms: u64,
    pub conversion_ms: u64,
    pub quote_ms: u64,
    pub total_ms: u64,
}

/// Source-file metadata carried on the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub duration_sec: f64,
    pub sample_rate: u32,
    pub denoised: bool,
}

/// Complete result of a batch or live job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub job_id: String,
    /// Segments ordered by `chunk_index` (non-decreasing `start_sec`).
    pub segments: Vec<ProcessedSegment>,
    pub metrics: TranscriptMetrics,
    pub source_metadata: SourceMetadata,
}

impl TranscriptResult {
    /// Concatenated Gurmukhi text of every segment.
    pub fn full_gurmukhi(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.gurmukhi.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Concatenated Roman text of every segment.
    pub fn full_roman(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.roman.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::EngineId;
    use crate::route::Route;

    fn sample_segment() -> ProcessedSegment {
        ProcessedSegment {
            segment_id: ProcessedSegment::new_segment_id(),
            chunk_index: 0,
            start_sec: 0.0,
            end_sec: 2.0,
            kind: SegmentKind::Speech,
            spoken_text: "ਧੰਨ ਗੁਰੂ".to_string(),
            gurmukhi: "ਧੰਨ ਗੁਰੂ".to_string(),
            roman: "dhan gurū".to_string(),
            language: "pa".to_string(),
            original_script: DetectedScript::Gurmukhi,
            route: RouteDecision::new(Route::Punjabi, "langid pa=0.92"),
            asr_confidence: 0.92,
            script_confidence: 1.0,
            quote_match: None,
            needs_review: false,
            per_engine_hypotheses: vec![Hypothesis::new(EngineId::General, "ਧੰਨ ਗੁਰੂ", "pa", 0.92)],
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_segment_json_field_names() {
        let segment = sample_segment();
        let value = serde_json::to_value(&segment).unwrap();
        assert!(value.get("start").is_some());
        assert!(value.get("end").is_some());
        assert_eq!(value["kind"], "speech");
        assert!(value.get("quote_match").is_none());
        assert_eq!(value["per_engine_hypotheses"][0]["engine_id"], "general");
    }

    #[test]
    fn test_full_text_concatenation() {
        let result = TranscriptResult {
            job_id: "job".to_string(),
            segments: vec![sample_segment(), sample_segment()],
            metrics: TranscriptMetrics::default(),
            source_metadata: SourceMetadata::default(),
        };
        assert_eq!(result.full_gurmukhi(), "ਧੰਨ ਗੁਰੂ ਧੰਨ ਗੁਰੂ");
    }

    #[test]
    fn test_converted_text_empty() {
        let converted = ConvertedText::empty("");
        assert_eq!(converted.conversion_confidence, 1.0);
        assert!(!converted.needs_review);
        assert_eq!(converted.original_script, DetectedScript::Empty);
    }
}
