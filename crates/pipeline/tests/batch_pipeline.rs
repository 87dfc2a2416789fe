//! End-to-end batch pipeline tests over scripted engines and an
//! in-memory scripture index.

mod common;

use std::time::Duration;

use katha_core::{DetectedScript, EngineId, SegmentKind};
use katha_pipeline::{JobHandle, JobOptions, ScriptedEngine};
use katha_pipeline::asr::ScriptedUtterance;

use common::{orchestrator_with, write_bursts_wav, write_empty_wav};

/// Plain speech through a single engine: text and roman survive, no
/// review flag.
#[tokio::test]
async fn test_plain_speech_single_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");
    write_bursts_wav(&path, 1, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ", "pa", 0.92));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert_eq!(segment.kind, SegmentKind::Speech);
    assert_eq!(segment.gurmukhi, "ਧੰਨ ਗੁਰੂ ਨਾਨਕ ਦੇਵ ਜੀ");
    assert_eq!(segment.roman, "dhan gurū nānak dev jī");
    assert!((segment.asr_confidence - 0.92).abs() < 1e-5);
    assert!(!segment.needs_review);
    assert_eq!(segment.per_engine_hypotheses.len(), 1);
}

/// Shahmukhi ASR output converts to Gurmukhi with dual rendition.
#[tokio::test]
async fn test_shahmukhi_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shahmukhi.wav");
    write_bursts_wav(&path, 1, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("دھن گرو نانک", "ur", 0.80));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert_eq!(segment.original_script, DetectedScript::Shahmukhi);
    assert_eq!(segment.gurmukhi, "ਧੰਨ ਗੁਰੂ ਨਾਨਕ");
    assert_eq!(segment.roman, "dhan gurū nānak");
    assert!(segment.script_confidence >= 0.7);
    assert!(!segment.needs_review);
}

/// A spoken line present verbatim in the index is replaced with the
/// canonical text, provenance preserved.
#[tokio::test]
async fn test_quote_replacement_high_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quote.wav");
    write_bursts_wav(&path, 1, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ", "pa", 0.88));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert_eq!(segment.kind, SegmentKind::ScriptureQuote);
    assert_eq!(segment.spoken_text, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ");
    assert_eq!(segment.gurmukhi, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ");
    let quote = segment.quote_match.as_ref().unwrap();
    assert_eq!(quote.ang, Some(1));
    assert!(quote.match_confidence >= 0.90);
    assert!(!segment.needs_review);
    assert_eq!(result.metrics.quotes_replaced, 1);
}

/// An imperfect echo of a canonical line lands in the review band:
/// attached as a suggestion, not replaced.
#[tokio::test]
async fn test_quote_suggestion_in_review_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suggest.wav");
    write_bursts_wav(&path, 1, 3.0);

    // Two vowel signs off the canonical mool-2 line.
    let general = ScriptedEngine::new(EngineId::General).with_utterance(
        0,
        ScriptedUtterance::new("ਸਤਿ ਨਾਮ ਕਰਤਾ ਪੁਰਖ ਨਿਰਭਉ ਨਿਰਵੈਰੁ", "pa", 0.85),
    );
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert_eq!(segment.kind, SegmentKind::Speech);
    assert_eq!(segment.gurmukhi, "ਸਤਿ ਨਾਮ ਕਰਤਾ ਪੁਰਖ ਨਿਰਭਉ ਨਿਰਵੈਰੁ");
    let suggestion = segment.quote_match.as_ref().unwrap();
    assert!(suggestion.match_confidence < 0.90);
    assert!(suggestion.match_confidence >= 0.70);
    assert!(segment.needs_review);
    assert_eq!(result.metrics.quotes_replaced, 0);
    assert_eq!(result.metrics.quotes_detected, 1);
}

/// Engine disagreement drives the re-decode policy; the widened-beam
/// pass recovers the cleaner hypothesis.
#[tokio::test]
async fn test_disagreement_triggers_redecode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redecode.wav");
    write_bursts_wav(&path, 1, 3.0);

    let clean = "ਸਾਫ ਸੁਥਰਾ ਵਾਕ ਮਿਲ ਗਿਆ";
    let general = ScriptedEngine::new(EngineId::General).with_utterance(
        0,
        ScriptedUtterance::new("ਗਰਬਲ ਸਕਰਿਪਟ ਟੈਕਸਟ", "pa", 0.55).with_redecode(clean, 0.90),
    );
    let indic = ScriptedEngine::new(EngineId::Indic)
        .with_utterance(0, ScriptedUtterance::new(clean, "pa", 0.52));
    let orchestrator = orchestrator_with(general, Some(indic), None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert!(result.metrics.redecode_passes >= 1);
    assert_eq!(segment.gurmukhi, clean);
    // The recovered confidence still sits below the review floor.
    assert!(segment.needs_review);
}

/// Segments come out ordered by chunk index with non-decreasing starts,
/// and every chunk yields a segment.
#[tokio::test]
async fn test_multi_chunk_ordering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.wav");
    write_bursts_wav(&path, 3, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਪਹਿਲਾ ਵਾਕ ਹੈ ਇਹ", "pa", 0.9))
        .with_utterance(1, ScriptedUtterance::new("ਦੂਜਾ ਵਾਕ ਹੈ ਇਹ", "pa", 0.9))
        .with_utterance(2, ScriptedUtterance::new("ਤੀਜਾ ਵਾਕ ਹੈ ਇਹ", "pa", 0.9));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 3);
    assert_eq!(result.metrics.chunk_count, 3);
    for (i, segment) in result.segments.iter().enumerate() {
        assert_eq!(segment.chunk_index, i as u64);
    }
    for pair in result.segments.windows(2) {
        assert!(pair[1].start_sec >= pair[0].start_sec);
    }
}

/// Empty audio yields zero segments and no error.
#[tokio::test]
async fn test_empty_audio_zero_segments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");
    write_empty_wav(&path);

    let orchestrator = orchestrator_with(ScriptedEngine::new(EngineId::General), None, None);
    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert!(result.segments.is_empty());
    assert_eq!(result.metrics.chunk_count, 0);
}

/// Undecodable input aborts the job with a fatal error.
#[tokio::test]
async fn test_missing_file_is_fatal() {
    let orchestrator = orchestrator_with(ScriptedEngine::new(EngineId::General), None, None);
    let err = orchestrator
        .transcribe_file(std::path::Path::new("/nonexistent.wav"), JobOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_fatal());
}

/// A pre-cancelled job drops every chunk and returns an empty result.
#[tokio::test]
async fn test_cancellation_drops_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cancel.wav");
    write_bursts_wav(&path, 2, 3.0);

    let orchestrator = orchestrator_with(ScriptedEngine::new(EngineId::General), None, None);
    let handle = JobHandle::new();
    handle.cancel();

    let result = orchestrator
        .transcribe_file(
            &path,
            JobOptions {
                job_id: Some("cancelled-job".to_string()),
                cancellation: Some(handle),
            },
        )
        .await
        .unwrap();

    assert!(result.segments.is_empty());
    assert_eq!(result.metrics.chunks_dropped, 2);
}

/// A timed-out engine contributes an empty hypothesis; the chunk still
/// yields a (review-flagged) segment.
#[tokio::test(start_paused = true)]
async fn test_engine_timeout_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slow.wav");
    write_bursts_wav(&path, 1, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਕਦੇ ਨਹੀਂ ਪਹੁੰਚਦਾ", "pa", 0.9))
        .with_latency(Duration::from_secs(300));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert!(segment.gurmukhi.is_empty());
    assert!(segment.needs_review);
    assert!(segment.errors.iter().any(|e| e.contains("timeout")));
}

/// Serialized segments carry the documented field set.
#[tokio::test]
async fn test_segment_json_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("json.wav");
    write_bursts_wav(&path, 1, 3.0);

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ", "pa", 0.88));
    let orchestrator = orchestrator_with(general, None, None);

    let result = orchestrator
        .transcribe_file(&path, JobOptions::default())
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    let segment = &json["segments"][0];
    for field in [
        "start",
        "end",
        "kind",
        "spoken_text",
        "gurmukhi",
        "roman",
        "language",
        "route",
        "asr_confidence",
        "script_confidence",
        "needs_review",
        "per_engine_hypotheses",
    ] {
        assert!(segment.get(field).is_some(), "missing field {field}");
    }
    let quote = &segment["quote_match"];
    for field in ["source", "line_id", "ang", "match_confidence"] {
        assert!(quote.get(field).is_some(), "missing quote field {field}");
    }
    let hypothesis = &segment["per_engine_hypotheses"][0];
    for field in ["engine_id", "text", "confidence"] {
        assert!(hypothesis.get(field).is_some(), "missing hypothesis field {field}");
    }
}
