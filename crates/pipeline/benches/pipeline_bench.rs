//! Benchmarks for the hot pipeline stages: VAD chunking and fusion.
//!
//! Run with: cargo bench -p katha-pipeline --bench pipeline_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use katha_config::{ChunkerConfig, FusionConfig};
use katha_core::{EngineId, Hypothesis, Route};
use katha_pipeline::{Chunker, FusionEngine};

fn synthetic_audio(seconds: usize) -> Vec<i16> {
    let mut samples = Vec::with_capacity(seconds * 16_000);
    for second in 0..seconds {
        // Alternate speech-like bursts and silences.
        let amplitude: i16 = if second % 3 == 2 { 0 } else { 6000 };
        for i in 0..16_000usize {
            let sample = if (i / 40) % 2 == 0 { amplitude } else { -amplitude };
            samples.push(sample);
        }
    }
    samples
}

fn bench_chunker(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunker");

    for seconds in [30usize, 120, 600] {
        let audio = synthetic_audio(seconds);
        group.throughput(Throughput::Elements(audio.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("chunk_batch", seconds),
            &audio,
            |b, audio| {
                b.iter(|| {
                    let chunker = Chunker::new(ChunkerConfig::default());
                    chunker.chunks("bench", audio).count()
                })
            },
        );
    }
    group.finish();
}

fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion");
    let engine = FusionEngine::new(FusionConfig::default());

    let agreeing = vec![
        Hypothesis::new(EngineId::General, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ ਨਿਰਭਉ ਨਿਰਵੈਰੁ", "pa", 0.85),
        Hypothesis::new(EngineId::Indic, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ ਨਿਰਭਉ ਨਿਰਵੈਰੁ", "pa", 0.82),
        Hypothesis::new(EngineId::English, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖ ਨਿਰਭਉ ਨਿਰਵੈਰ", "pa", 0.6),
    ];
    group.bench_function("three_way_agreeing", |b| {
        b.iter(|| engine.fuse(agreeing.clone(), Route::Punjabi).unwrap())
    });

    let disagreeing = vec![
        Hypothesis::new(EngineId::General, "ਗੁਰੂ ਸਾਹਿਬ ਨੇ ਬਚਨ ਕੀਤਾ ਸੀ ਉਸ ਦਿਨ", "pa", 0.55),
        Hypothesis::new(EngineId::Indic, "ਅੱਜ ਸੰਗਤ ਵਿਚ ਬੜੀ ਰੌਣਕ ਲੱਗੀ ਹੋਈ ਹੈ", "pa", 0.52),
    ];
    group.bench_function("two_way_disagreeing", |b| {
        b.iter(|| engine.fuse(disagreeing.clone(), Route::Punjabi).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_chunker, bench_fusion);
criterion_main!(benches);
