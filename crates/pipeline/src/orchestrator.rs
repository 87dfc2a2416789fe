//! The pipeline orchestrator.
//!
//! Drives chunking, routing, ASR fan-out, fusion, script conversion, and
//! the quote engine per chunk; assembles ordered segments and metrics.
//! Batch jobs run chunks across a bounded worker pool and release
//! completions strictly in `chunk_index` order. Live sessions process
//! submitted chunks sequentially, emitting a draft after conversion and
//! a verified event after the quote engine.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use katha_config::Settings;
use katha_core::transcript::SourceMetadata;
use katha_core::{
    AudioChunk, Hypothesis, ProcessedSegment, Result, Route, SegmentKind, TranscriptMetrics,
    TranscriptResult,
};
use katha_quotes::engine::route_warrants_detection;
use katha_quotes::QuoteEngine;
use katha_script::ScriptConverter;
use katha_scripture::ScriptureIndex;

use crate::asr::{AsrEngine, DecodeParams, EngineSet};
use crate::chunker::Chunker;
use crate::decode;
use crate::denoise::{build_denoiser, DenoiseFilter};
use crate::fusion::FusionEngine;
use crate::router::Router;

/// Callback receiving a segment event.
pub type SegmentCallback = Arc<dyn Fn(&ProcessedSegment) + Send + Sync>;

/// Callbacks injected at live-session construction.
#[derive(Clone)]
pub struct LiveCallbacks {
    /// Fired right after script conversion, before the quote engine.
    /// The draft tentatively carries `needs_review = true`.
    pub on_draft: SegmentCallback,
    /// Fired after the quote engine resolves; authoritative replacement
    /// for the draft with the same segment id.
    pub on_verified: SegmentCallback,
}

/// Pipeline events for observers (loss events, ordered completions).
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    SegmentReady(Box<ProcessedSegment>),
    /// A queued live chunk was dropped under backpressure.
    ChunkDropped { job_id: String, chunk_index: u64 },
    JobCancelled { job_id: String },
}

/// Per-job options.
#[derive(Clone, Default)]
pub struct JobOptions {
    pub job_id: Option<String>,
    /// Cancellation token; in-flight chunks finish, queued chunks drop.
    pub cancellation: Option<JobHandle>,
}

/// Cancellation token for a job.
#[derive(Clone, Default)]
pub struct JobHandle {
    cancelled: Arc<AtomicBool>,
}

impl JobHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct Orchestrator {
    settings: Settings,
    engines: EngineSet,
    fusion: FusionEngine,
    router: Router,
    converter: ScriptConverter,
    quotes: QuoteEngine,
    denoiser: Option<Box<dyn DenoiseFilter>>,
    asr_permits: Arc<Semaphore>,
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl Orchestrator {
    /// Build the orchestrator from settings, registered engines, and the
    /// shared scripture index.
    pub fn new(
        settings: Settings,
        engines: EngineSet,
        index: Arc<ScriptureIndex>,
    ) -> Result<Self> {
        settings.validate().map_err(katha_core::Error::from)?;

        let converter = ScriptConverter::new(&settings.script).map_err(katha_core::Error::from)?;
        let quotes = QuoteEngine::new(
            &settings.quotes,
            Arc::clone(&index),
            converter.romanizer().clone(),
        );
        let denoiser = build_denoiser(&settings.denoise);
        let asr_permits = Arc::new(Semaphore::new(settings.asr.asr_parallel_workers.max(1)));
        let (event_tx, _) = broadcast::channel(256);

        info!(
            quote_scope = quotes.search_scope_note(),
            denoise = denoiser.as_ref().map(|d| d.name()).unwrap_or("off"),
            "orchestrator ready"
        );

        Ok(Self {
            fusion: FusionEngine::new(settings.fusion.clone()),
            router: Router::new(settings.router.clone()),
            settings,
            engines,
            converter,
            quotes,
            denoiser,
            asr_permits,
            event_tx,
        })
    }

    /// Subscribe to pipeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// Transcribe a whole file. Fatal only on undecodable audio or
    /// broken configuration; per-chunk faults degrade into segments.
    pub async fn transcribe_file(
        self: &Arc<Self>,
        path: &Path,
        options: JobOptions,
    ) -> Result<TranscriptResult> {
        let job_id = options
            .job_id
            .clone()
            .unwrap_or_else(|| format!("job_{}", uuid::Uuid::new_v4().simple()));
        let handle = options.cancellation.clone().unwrap_or_default();
        let job_start = Instant::now();

        let decoded = decode::load_wav(path).map_err(katha_core::Error::from)?;
        let mut samples = decoded.samples;
        let mut denoised = false;
        if let Some(denoiser) = &self.denoiser {
            debug!(backend = denoiser.name(), "denoising input");
            samples = denoiser.apply(&samples);
            denoised = true;
        }

        let metrics = Arc::new(Mutex::new(TranscriptMetrics::default()));

        let chunk_start = Instant::now();
        let chunker = Chunker::new(self.settings.chunker.clone());
        let chunks: Vec<AudioChunk> = chunker.chunks(&job_id, &samples).collect();
        metrics.lock().chunking_ms = chunk_start.elapsed().as_millis() as u64;
        metrics.lock().chunk_count = chunks.len() as u64;
        info!(job_id = %job_id, chunks = chunks.len(), "chunked input");

        // Empty audio (or pure silence) is zero segments, not an error.
        if chunks.is_empty() {
            let mut metrics = metrics.lock().clone();
            metrics.total_ms = job_start.elapsed().as_millis() as u64;
            return Ok(TranscriptResult {
                job_id,
                segments: Vec::new(),
                metrics,
                source_metadata: SourceMetadata {
                    path: Some(path.display().to_string()),
                    duration_sec: decoded.duration_sec,
                    sample_rate: decoded.source_sample_rate,
                    denoised,
                },
            });
        }

        let prior_route = Arc::new(Mutex::new(None::<Route>));
        let chunk_permits = Arc::new(Semaphore::new(
            self.settings.asr.chunk_parallel_workers.max(1),
        ));

        let mut join_set: JoinSet<Option<ProcessedSegment>> = JoinSet::new();
        for chunk in chunks {
            let this = Arc::clone(self);
            let permits = Arc::clone(&chunk_permits);
            let handle = handle.clone();
            let prior = Arc::clone(&prior_route);
            let metrics = Arc::clone(&metrics);
            join_set.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return None;
                };
                // Cancellation drops chunks that have not started.
                if handle.is_cancelled() {
                    return None;
                }
                Some(this.process_chunk(chunk, prior, metrics, None).await)
            });
        }

        // Release completions strictly in chunk_index order.
        let mut pending: BTreeMap<u64, ProcessedSegment> = BTreeMap::new();
        let mut segments: Vec<ProcessedSegment> = Vec::new();
        let mut next_emit = 0u64;
        let mut dropped = 0u64;

        while let Some(joined) = join_set.join_next().await {
            let segment = match joined {
                Ok(Some(segment)) => segment,
                Ok(None) => {
                    dropped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "chunk task failed");
                    dropped += 1;
                    continue;
                }
            };
            pending.insert(segment.chunk_index, segment);

            while let Some(segment) = pending.remove(&next_emit) {
                let _ = self
                    .event_tx
                    .send(PipelineEvent::SegmentReady(Box::new(segment.clone())));
                segments.push(segment);
                next_emit += 1;
            }
        }
        // Cancellation leaves index gaps; flush the remainder in order.
        for (_, segment) in pending {
            segments.push(segment);
        }

        if handle.is_cancelled() {
            let _ = self.event_tx.send(PipelineEvent::JobCancelled {
                job_id: job_id.clone(),
            });
        }

        let mut metrics = metrics.lock().clone();
        metrics.segments_emitted = segments.len() as u64;
        metrics.chunks_dropped += dropped;
        metrics.segments_needing_review = segments.iter().filter(|s| s.needs_review).count() as u64;
        metrics.total_ms = job_start.elapsed().as_millis() as u64;

        Ok(TranscriptResult {
            job_id,
            segments,
            metrics,
            source_metadata: SourceMetadata {
                path: Some(path.display().to_string()),
                duration_sec: decoded.duration_sec,
                sample_rate: decoded.source_sample_rate,
                denoised,
            },
        })
    }

    /// Start a live session. Submitted chunks are processed in order;
    /// drafts fire after conversion and verified events after the quote
    /// engine, sharing the segment id.
    pub fn start_live_session(
        self: &Arc<Self>,
        options: JobOptions,
        callbacks: LiveCallbacks,
    ) -> LiveSession {
        let job_id = options
            .job_id
            .clone()
            .unwrap_or_else(|| format!("live_{}", uuid::Uuid::new_v4().simple()));
        let handle = options.cancellation.clone().unwrap_or_default();

        let queue: Arc<Mutex<VecDeque<AudioChunk>>> = Arc::new(Mutex::new(VecDeque::new()));
        let notify = Arc::new(Notify::new());
        let closed = Arc::new(AtomicBool::new(false));

        let worker = {
            let this = Arc::clone(self);
            let queue = Arc::clone(&queue);
            let notify = Arc::clone(&notify);
            let closed = Arc::clone(&closed);
            let handle = handle.clone();
            let job_id = job_id.clone();
            tokio::spawn(async move {
                this.live_worker(job_id, queue, notify, closed, handle, callbacks)
                    .await
            })
        };

        LiveSession {
            job_id,
            queue,
            notify,
            closed,
            handle,
            worker,
            queue_depth: self.settings.live.queue_depth.max(1),
            event_tx: self.event_tx.clone(),
        }
    }

    async fn live_worker(
        self: Arc<Self>,
        job_id: String,
        queue: Arc<Mutex<VecDeque<AudioChunk>>>,
        notify: Arc<Notify>,
        closed: Arc<AtomicBool>,
        handle: JobHandle,
        callbacks: LiveCallbacks,
    ) -> TranscriptResult {
        let metrics = Arc::new(Mutex::new(TranscriptMetrics::default()));
        let prior_route = Arc::new(Mutex::new(None::<Route>));
        let mut segments: Vec<ProcessedSegment> = Vec::new();
        let job_start = Instant::now();

        loop {
            if handle.is_cancelled() {
                let dropped = queue.lock().len() as u64;
                metrics.lock().chunks_dropped += dropped;
                queue.lock().clear();
                let _ = self.event_tx.send(PipelineEvent::JobCancelled {
                    job_id: job_id.clone(),
                });
                break;
            }

            let next = queue.lock().pop_front();
            let Some(chunk) = next else {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                notify.notified().await;
                continue;
            };

            metrics.lock().chunk_count += 1;
            let on_draft = Arc::clone(&callbacks.on_draft);
            let segment = self
                .process_chunk(
                    chunk,
                    Arc::clone(&prior_route),
                    Arc::clone(&metrics),
                    Some(on_draft),
                )
                .await;

            (callbacks.on_verified)(&segment);
            let _ = self
                .event_tx
                .send(PipelineEvent::SegmentReady(Box::new(segment.clone())));
            segments.push(segment);
        }

        let mut metrics = metrics.lock().clone();
        metrics.segments_emitted = segments.len() as u64;
        metrics.segments_needing_review = segments.iter().filter(|s| s.needs_review).count() as u64;
        metrics.total_ms = job_start.elapsed().as_millis() as u64;

        TranscriptResult {
            job_id,
            segments,
            metrics,
            source_metadata: SourceMetadata::default(),
        }
    }

    /// Process one chunk end to end: route, ASR fan-out, fusion with the
    /// re-decode policy, conversion, quote engine. Never fails; faults
    /// degrade into the segment.
    async fn process_chunk(
        &self,
        chunk: AudioChunk,
        prior_route: Arc<Mutex<Option<Route>>>,
        metrics: Arc<Mutex<TranscriptMetrics>>,
        on_draft: Option<SegmentCallback>,
    ) -> ProcessedSegment {
        let segment_id = ProcessedSegment::new_segment_id();
        let timeout = engine_timeout(&chunk, self.settings.asr.timeout_realtime_factor);

        // Engine A first; its hypothesis doubles as the router's quick
        // language pass.
        let asr_start = Instant::now();
        let first_pass = DecodeParams::for_route(Route::Unknown, &self.settings.asr);
        let hyp_a = self
            .run_engine(Arc::clone(&self.engines.general), &chunk, first_pass, timeout)
            .await;

        let prior = *prior_route.lock();
        let decision = self.router.route(&chunk, Some(&hyp_a), prior);
        debug!(
            chunk_index = chunk.chunk_index,
            route = decision.route.as_str(),
            reason = %decision.reason,
            "routed chunk"
        );
        *prior_route.lock() = Some(decision.route);

        // Fan out to the indic/english engines the route warrants.
        let additional = self.engines.additional_for_route(decision.route);
        let fanout = additional.into_iter().map(|engine| {
            let params = DecodeParams::for_route(decision.route, &self.settings.asr);
            self.run_engine(engine, &chunk, params, timeout)
        });
        let mut hypotheses: Vec<Hypothesis> = vec![hyp_a];
        hypotheses.extend(futures::future::join_all(fanout).await);
        metrics.lock().asr_ms += asr_start.elapsed().as_millis() as u64;

        // Fuse, then apply the re-decode policy while it keeps firing.
        let fusion_start = Instant::now();
        let mut errors: Vec<String> = hypotheses
            .iter()
            .filter_map(|h| h.engine_error.clone())
            .map(|reason| format!("engine_error: {reason}"))
            .collect();

        let mut outcome = match self.fusion.fuse(hypotheses, decision.route) {
            Ok(outcome) => outcome,
            Err(e) => {
                // Unreachable in practice: engine A always contributes
                // at least a degraded hypothesis.
                errors.push(format!("fusion_error: {e}"));
                return empty_segment(&chunk, segment_id, decision, errors);
            }
        };

        while self.fusion.should_redecode(&outcome) {
            debug!(
                chunk_index = chunk.chunk_index,
                confidence = outcome.fused_confidence,
                agreement = outcome.agreement_score,
                "re-decode pass"
            );
            metrics.lock().redecode_passes += 1;

            let beam = (self.settings.asr.beam_size as f32
                * self.settings.asr.redecode_beam_multiplier) as u32;
            // Widen the beam; when the first pass left the language
            // ambiguous, re-decode with the route's hint instead.
            let params = DecodeParams::for_route(decision.route, &self.settings.asr)
                .with_beam_size(beam.max(self.settings.asr.beam_size + 1));
            let params = if outcome.language == "unknown" {
                params.with_language_hint(decision.route.language_hint())
            } else {
                params
            };

            let redecoded = self
                .run_engine(Arc::clone(&self.engines.general), &chunk, params, timeout)
                .await;
            outcome = self.fusion.apply_redecode(outcome, redecoded, decision.route);
        }
        metrics.lock().fusion_ms += fusion_start.elapsed().as_millis() as u64;

        // Script conversion of the fused text.
        let convert_start = Instant::now();
        let language_hint = if outcome.language == "unknown" {
            decision.route.language_hint().map(str::to_string)
        } else {
            Some(outcome.language.clone())
        };
        let converted = self
            .converter
            .convert(&outcome.fused_text, language_hint.as_deref());
        metrics.lock().conversion_ms += convert_start.elapsed().as_millis() as u64;

        let fusion_review = self.fusion.needs_review(&outcome);
        let mut segment = ProcessedSegment {
            segment_id,
            chunk_index: chunk.chunk_index,
            start_sec: chunk.start_sec,
            end_sec: chunk.end_sec,
            kind: SegmentKind::Speech,
            spoken_text: converted.gurmukhi.clone(),
            gurmukhi: converted.gurmukhi.clone(),
            roman: converted.roman.clone(),
            language: converted_language(&outcome.language, &decision),
            original_script: converted.original_script,
            route: decision.clone(),
            asr_confidence: outcome.fused_confidence,
            script_confidence: converted.conversion_confidence,
            quote_match: None,
            needs_review: false,
            per_engine_hypotheses: outcome.hypotheses.clone(),
            errors,
        };

        // Draft event: tentative, before quote resolution.
        if let Some(on_draft) = on_draft {
            let mut draft = segment.clone();
            draft.needs_review = true;
            on_draft(&draft);
        }

        // Quote detection and canonical replacement.
        if route_warrants_detection(decision.route) && !segment.gurmukhi.is_empty() {
            let quote_start = Instant::now();
            let mut variants = vec![segment.gurmukhi.clone()];
            for hyp in outcome.usable_hypotheses() {
                let rendition = self.converter.convert(&hyp.text, Some(&hyp.language));
                if !rendition.gurmukhi.is_empty() && !variants.contains(&rendition.gurmukhi) {
                    variants.push(rendition.gurmukhi);
                }
            }

            let quote_outcome = self.quotes.process(&mut segment, &variants);
            let mut m = metrics.lock();
            m.quote_ms += quote_start.elapsed().as_millis() as u64;
            m.quote_candidates += quote_outcome.candidates as u64;
            if quote_outcome.matched {
                m.quotes_detected += 1;
            }
            if quote_outcome.replaced {
                m.quotes_replaced += 1;
            }
        }

        // Review policy. An accepted replacement clears review only for
        // the replacement itself; fusion and conversion flags stand.
        segment.needs_review = segment.needs_review
            || fusion_review
            || converted.needs_review
            || segment.per_engine_hypotheses.iter().all(|h| h.is_empty());

        if segment.kind == SegmentKind::ScriptureQuote {
            // A high-confidence canonical replacement overrides the
            // generic review flags.
            segment.needs_review = false;
        }

        segment
    }

    /// Run one engine under the ASR concurrency bound and the per-chunk
    /// timeout. Failures and timeouts degrade to empty hypotheses.
    async fn run_engine(
        &self,
        engine: Arc<dyn AsrEngine>,
        chunk: &AudioChunk,
        params: DecodeParams,
        timeout: Duration,
    ) -> Hypothesis {
        let id = engine.id();
        let Ok(_permit) = Arc::clone(&self.asr_permits).acquire_owned().await else {
            return Hypothesis::engine_error(id, "engine pool closed");
        };

        match tokio::time::timeout(timeout, engine.transcribe(chunk, &params)).await {
            Ok(Ok(hypothesis)) => hypothesis,
            Ok(Err(e)) => {
                warn!(engine = id.as_str(), error = %e, "engine failed");
                Hypothesis::engine_error(id, e.to_string())
            }
            Err(_) => {
                warn!(
                    engine = id.as_str(),
                    timeout_sec = timeout.as_secs_f64(),
                    "engine timed out"
                );
                Hypothesis::engine_error(
                    id,
                    format!("timeout after {:.1}s", timeout.as_secs_f64()),
                )
            }
        }
    }
}

/// Per-chunk engine deadline: a realtime multiple with a small floor so
/// short chunks are not starved.
fn engine_timeout(chunk: &AudioChunk, realtime_factor: f64) -> Duration {
    let seconds = (chunk.duration_sec() * realtime_factor).max(2.0);
    Duration::from_secs_f64(seconds)
}

fn converted_language(fused_language: &str, decision: &katha_core::RouteDecision) -> String {
    if fused_language != "unknown" {
        return fused_language.to_string();
    }
    decision
        .route
        .language_hint()
        .unwrap_or("unknown")
        .to_string()
}

/// Degraded segment for a chunk with no usable pipeline output.
fn empty_segment(
    chunk: &AudioChunk,
    segment_id: String,
    route: katha_core::RouteDecision,
    errors: Vec<String>,
) -> ProcessedSegment {
    ProcessedSegment {
        segment_id,
        chunk_index: chunk.chunk_index,
        start_sec: chunk.start_sec,
        end_sec: chunk.end_sec,
        kind: SegmentKind::Speech,
        spoken_text: String::new(),
        gurmukhi: String::new(),
        roman: String::new(),
        language: "unknown".to_string(),
        original_script: katha_core::DetectedScript::Unknown,
        route,
        asr_confidence: 0.0,
        script_confidence: 0.0,
        quote_match: None,
        needs_review: true,
        per_engine_hypotheses: Vec::new(),
        errors,
    }
}

/// A running live session. Chunks are submitted externally; the worker
/// processes them in arrival order.
pub struct LiveSession {
    job_id: String,
    queue: Arc<Mutex<VecDeque<AudioChunk>>>,
    notify: Arc<Notify>,
    closed: Arc<AtomicBool>,
    handle: JobHandle,
    worker: tokio::task::JoinHandle<TranscriptResult>,
    queue_depth: usize,
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl LiveSession {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Cancellation token for this session.
    pub fn handle(&self) -> JobHandle {
        self.handle.clone()
    }

    /// Submit a chunk. Beyond the configured queue depth the oldest
    /// unstarted chunk is dropped with a loss event; a chunk already
    /// being transcribed is never dropped.
    pub fn submit(&self, chunk: AudioChunk) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(crate::PipelineError::SessionClosed.into());
        }

        {
            let mut queue = self.queue.lock();
            if queue.len() >= self.queue_depth {
                if let Some(dropped) = queue.pop_front() {
                    warn!(
                        job_id = %self.job_id,
                        chunk_index = dropped.chunk_index,
                        "live queue full; dropping oldest unstarted chunk"
                    );
                    let _ = self.event_tx.send(PipelineEvent::ChunkDropped {
                        job_id: self.job_id.clone(),
                        chunk_index: dropped.chunk_index,
                    });
                }
            }
            queue.push_back(chunk);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Close the session: the worker drains the queue and returns the
    /// assembled transcript.
    pub async fn close(self) -> Result<TranscriptResult> {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
        self.worker
            .await
            .map_err(|e| katha_core::Error::Fusion(format!("live worker panicked: {e}")))
    }
}
