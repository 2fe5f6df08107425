// crates/verity-cli/src/main.rs
//
// CLI entrypoint for the Verity consensus engine.
//
// Loads configuration, initializes tracing on stderr, and dispatches to
// the evaluate, batch, state, and config subcommands. Results go to stdout.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::batch::BatchCmd;
use commands::evaluate::EvaluateCmd;
use commands::state::StateCmd;
use commands::Context;
use config::CliConfig;
use output::OutputFormat;

/// Verity CLI: multi-source consensus scoring.
#[derive(Parser, Debug)]
#[command(
    name = "verity",
    version = "0.1.0",
    about = "Score how strongly independent sources agree about a piece of content"
)]
struct Cli {
    /// Path to the TOML configuration file (default: ~/.verity/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Evaluate as of this Unix time instead of the system clock.
    #[arg(long, global = true)]
    now: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate a single JSON consensus request.
    Evaluate(EvaluateCmd),

    /// Evaluate a JSON Lines file of requests.
    Batch(BatchCmd),

    /// Classify a score into a consensus state.
    State(StateCmd),

    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let explicit = cli.config.is_some();
    let path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let loaded = CliConfig::load(&path);
    let log_level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", path.display());
            cfg
        }
        Err(e) if explicit => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                path.display(),
                e
            );
            CliConfig::default()
        }
        Err(_) => {
            tracing::debug!("No config at {}, using defaults", path.display());
            CliConfig::default()
        }
    };

    let ctx = Context {
        config,
        format: cli.format,
        now: cli.now,
    };

    match &cli.command {
        Commands::Evaluate(cmd) => commands::evaluate::run(cmd, &ctx).await?,
        Commands::Batch(cmd) => commands::batch::run(cmd, &ctx).await?,
        Commands::State(cmd) => commands::state::run(cmd, &ctx).await?,
        Commands::Config => commands::config::run(&ctx).await?,
    }

    Ok(())
}
