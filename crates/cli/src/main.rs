//! Batch transcription from the command line.
//!
//! Real model backends register out of tree; this binary drives the
//! pipeline with either fixture-scripted engines (for offline runs and
//! demos) or degraded null engines, which still exercises chunking,
//! routing, fusion, conversion, and quote matching end to end.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;

use katha_config::{init_tracing, load_settings};
use katha_core::EngineId;
use katha_pipeline::{
    AsrEngine, EngineSet, JobOptions, NullEngine, Orchestrator, ScriptedEngine,
};
use katha_pipeline::asr::ScriptedUtterance;
use katha_scripture::ScriptureIndex;

#[derive(Parser)]
#[command(name = "katha", about = "Gurbani katha transcription", version)]
struct Cli {
    /// Audio file to transcribe (16-bit PCM WAV).
    audio: PathBuf,

    /// Fixture file scripting per-chunk engine outputs (JSON).
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Configuration environment name (loads config/{env}.yaml).
    #[arg(long)]
    env: Option<String>,

    /// Write the transcript JSON here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Fixture schema: per-engine chunk scripts.
#[derive(Debug, Deserialize, Default)]
struct Fixture {
    #[serde(default)]
    general: Vec<FixtureUtterance>,
    #[serde(default)]
    indic: Vec<FixtureUtterance>,
    #[serde(default)]
    english: Vec<FixtureUtterance>,
}

#[derive(Debug, Deserialize)]
struct FixtureUtterance {
    chunk_index: u64,
    text: String,
    #[serde(default = "default_language")]
    language: String,
    confidence: f32,
}

fn default_language() -> String {
    "pa".to_string()
}

fn scripted_from(id: EngineId, utterances: &[FixtureUtterance]) -> Arc<dyn AsrEngine> {
    let mut engine = ScriptedEngine::new(id);
    for u in utterances {
        engine = engine.with_utterance(
            u.chunk_index,
            ScriptedUtterance::new(&u.text, &u.language, u.confidence),
        );
    }
    Arc::new(engine)
}

fn build_engines(fixture_path: Option<&Path>) -> Result<EngineSet, String> {
    let Some(path) = fixture_path else {
        return Ok(EngineSet::new(
            Arc::new(NullEngine::new(
                EngineId::General,
                "no model backend registered; pass --fixture for offline runs",
            )),
            None,
            None,
        ));
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read fixture {}: {e}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid fixture {}: {e}", path.display()))?;

    let indic = (!fixture.indic.is_empty())
        .then(|| scripted_from(EngineId::Indic, &fixture.indic));
    let english = (!fixture.english.is_empty())
        .then(|| scripted_from(EngineId::English, &fixture.english));

    Ok(EngineSet::new(
        scripted_from(EngineId::General, &fixture.general),
        indic,
        english,
    ))
}

async fn run(cli: Cli) -> Result<(), String> {
    let settings = load_settings(cli.env.as_deref()).map_err(|e| e.to_string())?;
    init_tracing(&settings.observability);

    let index = ScriptureIndex::open(
        Path::new(&settings.scripture.sggs_path),
        settings.scripture.dasam_path.as_deref().map(Path::new),
    )
    .map_err(|e| e.to_string())?;

    let engines = build_engines(cli.fixture.as_deref())?;
    let orchestrator = Arc::new(
        Orchestrator::new(settings, engines, Arc::new(index)).map_err(|e| e.to_string())?,
    );

    let result = orchestrator
        .transcribe_file(&cli.audio, JobOptions::default())
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!(
        segments = result.segments.len(),
        quotes_replaced = result.metrics.quotes_replaced,
        needing_review = result.metrics.segments_needing_review,
        "transcription complete"
    );

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
