//! Live session tests: draft/verified eventing, silent chunks, and
//! queue backpressure.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use katha_core::{AudioChunk, EngineId, ProcessedSegment, SegmentKind, SourceMode};
use katha_pipeline::asr::ScriptedUtterance;
use katha_pipeline::{JobOptions, LiveCallbacks, PipelineEvent, ScriptedEngine};

use common::orchestrator_with;

fn live_chunk(index: u64, amplitude: i16, duration_sec: f64) -> AudioChunk {
    let samples = vec![amplitude; (duration_sec * 16_000.0) as usize];
    AudioChunk::new(
        "live-job",
        index,
        index as f64 * duration_sec,
        (index + 1) as f64 * duration_sec,
        samples,
        SourceMode::Live,
    )
}

fn recording_callbacks() -> (
    LiveCallbacks,
    Arc<Mutex<Vec<ProcessedSegment>>>,
    Arc<Mutex<Vec<ProcessedSegment>>>,
) {
    let drafts: Arc<Mutex<Vec<ProcessedSegment>>> = Arc::new(Mutex::new(Vec::new()));
    let verified: Arc<Mutex<Vec<ProcessedSegment>>> = Arc::new(Mutex::new(Vec::new()));

    let drafts_cb = Arc::clone(&drafts);
    let verified_cb = Arc::clone(&verified);
    let callbacks = LiveCallbacks {
        on_draft: Arc::new(move |segment| drafts_cb.lock().push(segment.clone())),
        on_verified: Arc::new(move |segment| verified_cb.lock().push(segment.clone())),
    };
    (callbacks, drafts, verified)
}

/// One live chunk produces a draft then a verified event sharing the
/// segment id and time range; the draft is tentatively review-flagged.
#[tokio::test]
async fn test_draft_then_verified_share_identity() {
    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ", "pa", 0.9));
    let orchestrator = orchestrator_with(general, None, None);

    let (callbacks, drafts, verified) = recording_callbacks();
    let session = orchestrator.start_live_session(JobOptions::default(), callbacks);

    session.submit(live_chunk(0, 5000, 2.0)).unwrap();
    let result = session.close().await.unwrap();

    let drafts = drafts.lock();
    let verified = verified.lock();
    assert_eq!(drafts.len(), 1);
    assert_eq!(verified.len(), 1);

    let draft = &drafts[0];
    let verified = &verified[0];
    assert_eq!(draft.segment_id, verified.segment_id);
    assert_eq!(draft.start_sec, verified.start_sec);
    assert_eq!(draft.end_sec, verified.end_sec);
    assert!(draft.needs_review);
    assert_eq!(draft.kind, SegmentKind::Speech);
    // The verified event resolved the quote and replaced the draft.
    assert_eq!(verified.kind, SegmentKind::ScriptureQuote);
    assert!(!verified.needs_review);

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.metrics.quotes_replaced, 1);
}

/// Drafts never overtake verified events across chunk indices.
#[tokio::test]
async fn test_event_ordering_across_chunks() {
    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(0, ScriptedUtterance::new("ਪਹਿਲਾ ਵਾਕ ਹੈ ਇਹ", "pa", 0.9))
        .with_utterance(1, ScriptedUtterance::new("ਦੂਜਾ ਵਾਕ ਹੈ ਇਹ", "pa", 0.9));
    let orchestrator = orchestrator_with(general, None, None);

    let order: Arc<Mutex<Vec<(u64, &'static str)>>> = Arc::new(Mutex::new(Vec::new()));
    let draft_order = Arc::clone(&order);
    let verified_order = Arc::clone(&order);
    let callbacks = LiveCallbacks {
        on_draft: Arc::new(move |s| draft_order.lock().push((s.chunk_index, "draft"))),
        on_verified: Arc::new(move |s| verified_order.lock().push((s.chunk_index, "verified"))),
    };

    let session = orchestrator.start_live_session(JobOptions::default(), callbacks);
    session.submit(live_chunk(0, 5000, 2.0)).unwrap();
    session.submit(live_chunk(1, 5000, 2.0)).unwrap();
    session.close().await.unwrap();

    let order = order.lock();
    assert_eq!(
        *order,
        vec![
            (0, "draft"),
            (0, "verified"),
            (1, "draft"),
            (1, "verified"),
        ]
    );
}

/// A silent chunk yields an empty, review-flagged segment.
#[tokio::test]
async fn test_silent_chunk_flagged_for_review() {
    // No scripted utterance: the engine hears nothing.
    let orchestrator = orchestrator_with(ScriptedEngine::new(EngineId::General), None, None);
    let (callbacks, _drafts, _verified) = recording_callbacks();
    let session = orchestrator.start_live_session(JobOptions::default(), callbacks);

    session.submit(live_chunk(0, 0, 2.0)).unwrap();
    let result = session.close().await.unwrap();

    assert_eq!(result.segments.len(), 1);
    let segment = &result.segments[0];
    assert!(segment.gurmukhi.is_empty());
    assert!(segment.needs_review);
}

/// Beyond the queue depth the oldest unstarted chunk drops with a loss
/// event; started chunks are never dropped.
#[tokio::test]
async fn test_backpressure_drops_oldest_unstarted() {
    let mut settings = katha_config::Settings::default();
    settings.live.queue_depth = 2;

    let general = ScriptedEngine::new(EngineId::General)
        .with_utterance(3, ScriptedUtterance::new("ਤੀਜਾ ਵਾਕ ਹੈ", "pa", 0.9))
        .with_utterance(4, ScriptedUtterance::new("ਚੌਥਾ ਵਾਕ ਹੈ", "pa", 0.9));
    let orchestrator =
        common::orchestrator_with_settings(settings, general, None, None);

    let mut events = orchestrator.subscribe();
    let (callbacks, _drafts, _verified) = recording_callbacks();
    let session = orchestrator.start_live_session(JobOptions::default(), callbacks);

    // The worker cannot run between these synchronous submits on the
    // current-thread test runtime, so the queue overflows.
    for index in 0..5 {
        session.submit(live_chunk(index, 5000, 1.0)).unwrap();
    }
    let result = session.close().await.unwrap();

    // Chunks 0..=2 dropped, 3 and 4 survived.
    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].chunk_index, 3);
    assert_eq!(result.segments[1].chunk_index, 4);

    let mut dropped = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PipelineEvent::ChunkDropped { chunk_index, .. } = event {
            dropped.push(chunk_index);
        }
    }
    assert_eq!(dropped, vec![0, 1, 2]);
}

/// A cancelled session drops its queue and closes with an empty result.
#[tokio::test]
async fn test_cancelled_session_returns_empty() {
    let orchestrator = orchestrator_with(ScriptedEngine::new(EngineId::General), None, None);
    let (callbacks, _drafts, _verified) = recording_callbacks();
    let session = orchestrator.start_live_session(JobOptions::default(), callbacks);

    let handle = session.handle();
    handle.cancel();
    let result = session.close().await.unwrap();
    assert!(result.segments.is_empty());
}
