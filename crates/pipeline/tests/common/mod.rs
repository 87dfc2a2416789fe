//! Shared fixtures for pipeline integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};

use katha_config::Settings;
use katha_core::{EngineId, ScriptureLine, ScriptureSource};
use katha_pipeline::{AsrEngine, EngineSet, Orchestrator, ScriptedEngine};
use katha_scripture::ScriptureIndex;

pub const SAMPLE_RATE: u32 = 16_000;

/// Write a WAV of alternating speech bursts and silences. Each burst
/// becomes one chunk under the default chunker settings.
pub fn write_bursts_wav(path: &Path, bursts: usize, burst_sec: f64) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();

    for _ in 0..bursts {
        for i in 0..(burst_sec * SAMPLE_RATE as f64) as usize {
            // A 200 Hz square-ish wave well above the VAD threshold.
            let sample = if (i / 40) % 2 == 0 { 6000i16 } else { -6000i16 };
            writer.write_sample(sample).unwrap();
        }
        for _ in 0..SAMPLE_RATE {
            writer.write_sample(0i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

pub fn write_empty_wav(path: &Path) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    WavWriter::create(path, spec).unwrap().finalize().unwrap();
}

/// Scripture fixture: the Mool Mantar opening split across index lines.
pub fn mool_mantar_index() -> Arc<ScriptureIndex> {
    Arc::new(ScriptureIndex::from_lines(vec![
        ScriptureLine::new("mool-1", ScriptureSource::Sggs, "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ")
            .with_ang(1)
            .with_author("Guru Nanak Dev Ji")
            .with_shabad("mool", 1),
        ScriptureLine::new(
            "mool-2",
            ScriptureSource::Sggs,
            "ਸਤਿ ਨਾਮੁ ਕਰਤਾ ਪੁਰਖੁ ਨਿਰਭਉ ਨਿਰਵੈਰੁ",
        )
        .with_ang(1)
        .with_shabad("mool", 2),
        ScriptureLine::new("japji-1", ScriptureSource::Sggs, "ਆਦਿ ਸਚੁ ਜੁਗਾਦਿ ਸਚੁ ॥")
            .with_ang(1)
            .with_shabad("japji", 1),
    ]))
}

/// Orchestrator with a scripted general engine and optional B/C engines.
pub fn orchestrator_with(
    general: ScriptedEngine,
    indic: Option<ScriptedEngine>,
    english: Option<ScriptedEngine>,
) -> Arc<Orchestrator> {
    orchestrator_with_settings(Settings::default(), general, indic, english)
}

pub fn orchestrator_with_settings(
    settings: Settings,
    general: ScriptedEngine,
    indic: Option<ScriptedEngine>,
    english: Option<ScriptedEngine>,
) -> Arc<Orchestrator> {
    debug_assert_eq!(general.id(), EngineId::General);
    let engines = EngineSet::new(
        Arc::new(general),
        indic.map(|e| Arc::new(e) as Arc<dyn AsrEngine>),
        english.map(|e| Arc::new(e) as Arc<dyn AsrEngine>),
    );
    Arc::new(Orchestrator::new(settings, engines, mool_mantar_index()).unwrap())
}
