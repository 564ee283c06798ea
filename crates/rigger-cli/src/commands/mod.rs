//! CLI command implementations.

pub mod exec;

use anyhow::{Context, Result};
use rigger_backend::{BackendKind, HttpDownloader, ScratchDir};
use rigger_compiler::Compiler;
use rigger_config::{EnvContext, Scenario};
use rigger_core::{Action, ScenarioDocument};
use std::path::Path;

/// Read and decode a scenario file without normalizing it.
pub fn read_document(path: &Path) -> Result<ScenarioDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scenario: {}", path.display()))
}

/// Normalize and compile on a blocking task; downloads use a blocking client.
pub async fn compile_document(
    document: ScenarioDocument,
    backend: BackendKind,
    scratch: ScratchDir,
) -> Result<Vec<Action>> {
    tokio::task::spawn_blocking(move || -> Result<Vec<Action>> {
        let downloader = HttpDownloader::new(scratch);
        let scenario =
            Scenario::normalize(document, &downloader).context("Failed to normalize scenario")?;
        Compiler::new(backend, EnvContext::from_process())
            .compile(&scenario)
            .context("Failed to compile scenario")
    })
    .await
    .context("Compilation task failed")?
}

pub async fn compile(path: &Path, backend: BackendKind) -> Result<()> {
    let document = read_document(path)?;
    let actions = compile_document(document, backend, ScratchDir::default()).await?;
    println!("{}", serde_json::to_string_pretty(&actions)?);
    Ok(())
}

pub async fn validate(path: &Path, backend: BackendKind) -> Result<()> {
    let result = match read_document(path) {
        Ok(document) => compile_document(document, backend, ScratchDir::default()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(actions) => {
            println!("Scenario is valid ({} actions)", actions.len());
            Ok(())
        }
        Err(e) => {
            println!("Scenario error: {:#}", e);
            std::process::exit(1);
        }
    }
}
