//! REST API for the biollm pipeline.
//!
//! Exposes the pipeline to browser and service clients:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/process-input` | Answer a text question in the caller's language |
//! | `POST /api/process-audio` | Transcribe and answer a spoken question |
//! | `POST /api/pipeline` | Run a full [`PipelineRequest`](biollm_types::PipelineRequest) |
//! | `GET /api/health` | Liveness and version |

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use biollm_core::{Pipeline, ResponseComposer};
use biollm_types::config::{PipelineConfig, ServerConfig};

/// Shared state accessible by all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub composer: ResponseComposer,
    /// Defaults for requests built from the simplified routes.
    pub defaults: Arc<PipelineConfig>,
    /// When this state was built, reported as uptime by the health route.
    pub started: Instant,
}

impl ApiState {
    pub fn new(pipeline: Pipeline, defaults: PipelineConfig) -> Self {
        Self {
            composer: pipeline.composer(),
            pipeline: Arc::new(pipeline),
            defaults: Arc::new(defaults),
            started: Instant::now(),
        }
    }
}

/// Build the API router with all routes.
pub fn build_router(state: ApiState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .nest("/api", handlers::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `server.host:server.port` and serve until `shutdown` resolves.
///
/// The host may be an IP literal (v4 or v6) or a name to resolve.
pub async fn serve<F>(state: ApiState, server: &ServerConfig, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port)).await?;
    info!(addr = %listener.local_addr()?, "API server listening");

    axum::serve(listener, build_router(state, &server.cors_origins))
        .with_graceful_shutdown(shutdown)
        .await
}
