//! `biollm serve` -- run the REST API until Ctrl+C.

use clap::Args;
use tracing::info;

use biollm_api::ApiState;
use biollm_types::Config;

use super::build_pipeline;

/// Arguments for the `biollm serve` subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn run(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let pipeline = build_pipeline(&config)?;
    let state = ApiState::new(pipeline, config.pipeline.clone());

    biollm_api::serve(state, &config.server, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
        }
    })
    .await?;

    info!("server shutdown complete");
    Ok(())
}
