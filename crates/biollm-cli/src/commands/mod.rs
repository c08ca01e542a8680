//! Subcommand implementations and the helpers they share.

pub mod ask;
pub mod config_cmd;
pub mod listen;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use biollm_core::{ComposedReply, Pipeline};
use biollm_endpoint::HttpEndpointClient;
use biollm_types::{Config, PipelineRequest, PipelineResponse};

/// Load configuration from the given path override or via auto-discovery.
///
/// An explicit path must exist. Without one, the discovery chain is
/// `BIOLLM_CONFIG`, then `~/.biollm/config.json`, then defaults.
pub async fn load_config(config_override: Option<&str>) -> anyhow::Result<Config> {
    let explicit = config_override.map(Path::new);
    if let Some(path) = explicit
        && !path.exists()
    {
        anyhow::bail!("config file not found: {}", path.display());
    }
    let config = biollm_core::config_loader::load_config(explicit)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
    Ok(config)
}

/// Build a pipeline backed by the configured HTTP endpoints.
pub fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let api_key = config.endpoints.resolved_api_key();
    let client = HttpEndpointClient::new(config.endpoints.clone(), api_key)?;
    debug!(base_url = %config.endpoints.base_url, "endpoint client ready");
    Ok(Pipeline::new(Arc::new(client)))
}

/// Run one request, cancelling it on Ctrl+C, and compose the reply.
pub async fn run_once(
    pipeline: &Pipeline,
    request: &PipelineRequest,
) -> (PipelineResponse, ComposedReply) {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    let response = pipeline.run_with_cancel(request, cancel).await;
    watcher.abort();

    let reply = pipeline.composer().compose(request, &response).await;
    (response, reply)
}

/// Print the outcome of a run.
///
/// With `json`, the full stage record goes to stdout. Otherwise only the
/// transcript (if any) and the answer are printed. A failed run is an
/// error either way.
pub fn print_outcome(
    response: &PipelineResponse,
    reply: &ComposedReply,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        if let Some(transcribed) = &reply.transcribed {
            println!("Transcribed: {transcribed}");
        }
        if let Some(answer) = &reply.response {
            println!("{answer}");
        }
    }

    match &reply.error {
        Some(error) => anyhow::bail!("{error}"),
        None => Ok(()),
    }
}
