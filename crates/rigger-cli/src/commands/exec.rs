//! Scenario execution command.

use super::{compile_document, read_document};
use crate::ExecArgs;
use anyhow::{Context, Result};
use rigger_backend::{Invocation, ScratchDir};
use rigger_core::Suffix;
use tracing::info;

/// Compile the scenario and run each selected action in order.
pub async fn run(args: ExecArgs, debug: u8) -> Result<()> {
    let invocation = Invocation {
        base_dir: Invocation::base_dir_of(&args.config),
        git_key: args.git_key,
        private_key: args.private_key,
        inventory: args.inventory,
        playbook_path: args.playbook_path,
        debug,
    };
    args.backend
        .validate(&invocation)
        .context("Invalid parameters")?;

    let document = read_document(&args.config)?;
    let suffix = Suffix::new(&document.id, &document.env);

    let scratch = ScratchDir::default();
    let removed = scratch
        .cleanup(suffix.as_str())
        .context("Failed to clean scratch files")?;
    info!(%suffix, removed, "Cleaned previous scratch files");

    let actions = compile_document(document, args.backend, scratch.clone()).await?;
    info!(count = actions.len(), backend = %args.backend, "Compiled scenario");

    let mut ran = 0;
    for mut action in actions {
        if !action.matches_trigger(&args.trigger) {
            info!(action = %action.name, trigger = %args.trigger, "Skipping action");
            continue;
        }
        invocation
            .prepare(&mut action)
            .with_context(|| format!("Failed to prepare action '{}'", action.name))?;
        args.backend
            .run(&action, &scratch)
            .await
            .with_context(|| format!("Action '{}' failed", action.name))?;
        ran += 1;
    }

    info!(ran, "Scenario applied");
    Ok(())
}
