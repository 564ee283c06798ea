//! Rigger CLI tool.

use clap::{Args, Parser, Subcommand};
use rigger_backend::BackendKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rigger")]
#[command(about = "Compile deployment scenarios into backend actions", long_about = None)]
struct Cli {
    /// Verbosity, 0-3. Also forwarded to the backend.
    #[arg(long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a scenario and run its actions
    Exec(ExecArgs),
    /// Compile a scenario and print the actions as JSON
    Compile(ScenarioArgs),
    /// Check that a scenario compiles
    Validate(ScenarioArgs),
}

#[derive(Args)]
struct ScenarioArgs {
    /// Path to the scenario file
    #[arg(long, default_value = "./config.json")]
    config: PathBuf,

    /// Backend the actions are compiled for
    #[arg(long, env = "RIGGER_BACKEND", default_value = "ansible")]
    backend: BackendKind,
}

#[derive(Args)]
struct ExecArgs {
    /// Path to the scenario file
    #[arg(long, default_value = "./config.json")]
    config: PathBuf,

    /// Backend that runs the actions
    #[arg(long, env = "RIGGER_BACKEND")]
    backend: BackendKind,

    /// SSH key for repository checkouts
    #[arg(long, default_value = "~/.ssh/id_rsa")]
    git_key: String,

    /// SSH key used to reach the hosts
    #[arg(long, default_value = "")]
    private_key: String,

    /// Only run non-running actions whose name ends with this value
    #[arg(long, default_value = "")]
    trigger: String,

    /// Inventory file handed to the backend
    #[arg(long, default_value = "./hosts/local")]
    inventory: String,

    /// Directory containing the backend's plays
    #[arg(long, default_value = "")]
    playbook_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug > 0 { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Exec(args) => {
            commands::exec::run(args, cli.debug).await?;
        }
        Commands::Compile(args) => {
            commands::compile(&args.config, args.backend).await?;
        }
        Commands::Validate(args) => {
            commands::validate(&args.config, args.backend).await?;
        }
    }

    Ok(())
}
