//! `revguard` -- forward proxy that steers wiki readers away from
//! anonymously edited article revisions.
//!
//! Provides the following subcommands:
//!
//! - `revguard serve` -- Run the forward proxy with revision inspection.
//! - `revguard check` -- Inspect one article's history and print the decision.
//! - `revguard config` -- Show the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;
mod proxy;

/// Wiki revision guard.
#[derive(Parser)]
#[command(name = "revguard", about = "Wiki revision guard forward proxy", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the forward proxy.
    Serve(commands::serve::ServeArgs),

    /// Inspect an article's recent revisions.
    Check(commands::check::CheckArgs),

    /// Show resolved configuration.
    Config(commands::config_cmd::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Check(args) => commands::check::run(args).await?,
        Commands::Config(args) => commands::config_cmd::run(args)?,
    }

    Ok(())
}
