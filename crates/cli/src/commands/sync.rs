//! Feed an event script through the sync worker.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use vision_core::{
    CharacterId, DetectionModeEntry, SightConfig, TokenId, TokenReconciler, VisionModeRegistry,
};
use vision_runtime::{
    Orchestrator, PerceptionRefresh, RuntimeError, SceneLoader, SyncEvent, SyncWorker,
};

use crate::args::{OutputFormat, SceneArgs};

/// Feed events through the sync worker and print the resulting perception
#[derive(Parser, Debug)]
pub struct SyncCommand {
    #[command(flatten)]
    scene: SceneArgs,

    /// Event script (RON list); defaults to a single scene activation
    #[arg(short, long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct SyncOutput {
    characters: Vec<CharacterId>,
    patched: Vec<TokenId>,
    failed: Vec<FailedToken>,
    refreshes: usize,
    tokens: Vec<TokenPerception>,
}

#[derive(Debug, Serialize)]
struct FailedToken {
    token: TokenId,
    error: String,
}

#[derive(Debug, Serialize)]
struct TokenPerception {
    id: TokenId,
    name: String,
    sight: SightConfig,
    detection_modes: Vec<DetectionModeEntry>,
}

impl SyncCommand {
    pub async fn execute(self) -> Result<()> {
        let (scene, config) = self.scene.load()?;
        let events = match &self.events {
            Some(path) => SceneLoader::load_events(path)?,
            None => vec![SyncEvent::SceneActivated],
        };

        let reconciler = TokenReconciler::new(config, VisionModeRegistry::standard());
        let orchestrator = Orchestrator::new(reconciler, self.scene.viewer());
        let (handle, worker) = SyncWorker::spawn(
            orchestrator,
            scene,
            Vec::<PerceptionRefresh>::new(),
            events.len(),
        );

        info!(events = events.len(), "feeding events");
        for event in events {
            handle.send(event).await?;
        }
        let report = handle.sync().await?;
        drop(handle);
        let (scene, refreshes) = worker.await.map_err(RuntimeError::WorkerJoin)?;

        let snapshot = scene.snapshot();
        let output = SyncOutput {
            characters: report.characters.clone(),
            patched: report
                .reports
                .iter()
                .flat_map(|report| report.patched.iter().copied())
                .collect(),
            failed: report
                .reports
                .iter()
                .flat_map(|report| &report.failed)
                .map(|(token, err)| FailedToken {
                    token: *token,
                    error: err.to_string(),
                })
                .collect(),
            refreshes: refreshes.len(),
            tokens: snapshot
                .tokens
                .into_iter()
                .map(|token| TokenPerception {
                    id: token.id,
                    name: token.name,
                    sight: token.sight,
                    detection_modes: token.detection_modes,
                })
                .collect(),
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
            OutputFormat::Summary => print_summary(&output),
        }
        Ok(())
    }
}

fn print_summary(output: &SyncOutput) {
    println!(
        "{} character(s), {} token(s) patched, {} failed, {} refresh signal(s)",
        output.characters.len(),
        output.patched.len(),
        output.failed.len(),
        output.refreshes
    );
    for token in &output.tokens {
        let modes: Vec<String> = token
            .detection_modes
            .iter()
            .map(|entry| format!("{}@{}", entry.id, entry.range))
            .collect();
        println!(
            "  {} ({}): {} range {} [{}]",
            token.name,
            token.id,
            token.sight.vision_mode,
            token.sight.range,
            modes.join(", ")
        );
    }
    for failed in &output.failed {
        println!("  failed {}: {}", failed.token, failed.error);
    }
}
