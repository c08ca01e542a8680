//! `biollm` -- CLI binary for the biomedical question-answering pipeline.
//!
//! Provides the following subcommands:
//!
//! - `biollm ask` -- Answer a text question.
//! - `biollm listen` -- Transcribe a recording and answer it.
//! - `biollm serve` -- Start the REST API server.
//! - `biollm config` -- Inspect the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// Biomedical question-answering CLI.
#[derive(Parser)]
#[command(name = "biollm", about = "Biomedical question-answering pipeline", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a text question.
    Ask(commands::ask::AskArgs),

    /// Transcribe a recording and answer it.
    Listen(commands::listen::ListenArgs),

    /// Start the REST API server.
    Serve(commands::serve::ServeArgs),

    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration as JSON.
    Show {
        /// Only print this top-level section (endpoints, pipeline, server).
        section: Option<String>,
    },
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

    let config = commands::load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, config).await?,
        Commands::Listen(args) => commands::listen::run(args, config).await?,
        Commands::Serve(args) => commands::serve::run(args, config).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show { section } => {
                commands::config_cmd::config_show(&config, section.as_deref())?
            }
        },
    }

    Ok(())
}
