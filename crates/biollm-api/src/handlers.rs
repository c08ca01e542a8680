//! HTTP request handlers for the REST API.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::warn;

use biollm_core::ComposedReply;
use biollm_types::{PipelineRequest, PipelineResponse};

use super::ApiState;

/// Build all API routes.
pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/process-input", post(process_input))
        .route("/process-audio", post(process_audio))
        .route("/pipeline", post(run_pipeline))
        .route("/health", get(health_check))
}

/// A failed request, rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn default_language() -> String {
    "en".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInputBody {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_language")]
    pub source_language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAudioBody {
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default = "default_language")]
    pub source_language: String,
}

/// Apply the configured pipeline defaults to a simplified request.
fn with_defaults(state: &ApiState, request: PipelineRequest) -> PipelineRequest {
    let defaults = &state.defaults;
    let mut request = request
        .with_target_language(defaults.target_language.clone())
        .with_generation_params(defaults.generation.clone());
    request.rag_category = defaults.rag_category.clone();
    request
}

async fn answer(state: &ApiState, request: PipelineRequest) -> Result<ComposedReply, ApiError> {
    if let Err(e) = request.validate() {
        return Err(ApiError::bad_request(e.to_string()));
    }
    let response = state.pipeline.run(&request).await;
    let reply = state.composer.compose(&request, &response).await;
    if let Some(error) = &reply.error {
        warn!(request_id = %response.request_id, error = %error, "request failed");
        return Err(ApiError::internal(error.clone()));
    }
    Ok(reply)
}

/// Answer a text question. The question doubles as the retrieval query.
async fn process_input(
    State(state): State<ApiState>,
    Json(body): Json<ProcessInputBody>,
) -> Result<Json<ComposedReply>, ApiError> {
    let request = with_defaults(
        &state,
        PipelineRequest::text(body.text.clone(), body.source_language),
    )
    .with_rag_query(body.text);
    answer(&state, request).await.map(Json)
}

/// Transcribe and answer a spoken question.
async fn process_audio(
    State(state): State<ApiState>,
    Json(body): Json<ProcessAudioBody>,
) -> Result<Json<ComposedReply>, ApiError> {
    let Some(audio_ref) = body.audio_ref.filter(|r| !r.trim().is_empty()) else {
        return Err(ApiError::bad_request("No audio reference provided"));
    };
    let request = with_defaults(
        &state,
        PipelineRequest::audio(audio_ref).with_source_language(body.source_language),
    );
    answer(&state, request).await.map(Json)
}

/// Run a caller-assembled request and return the full stage record.
async fn run_pipeline(
    State(state): State<ApiState>,
    Json(request): Json<PipelineRequest>,
) -> Json<PipelineResponse> {
    Json(state.pipeline.run(&request).await)
}

async fn health_check(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "client": state.pipeline.client_name(),
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use biollm_core::Pipeline;
    use biollm_endpoint::{Capability, EndpointError, ScriptedEndpointClient};
    use biollm_types::config::PipelineConfig;

    fn app(client: Arc<ScriptedEndpointClient>) -> Router {
        let state = ApiState::new(Pipeline::new(client), PipelineConfig::default());
        crate::build_router(state, &[])
    }

    fn search_ok() -> Value {
        json!({"status": "SUCCESS", "completed": true, "data": "anginal context"})
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = app(Arc::new(ScriptedEndpointClient::new()))
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["client"], "scripted");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn health_uptime_counts_from_state_creation() {
        let mut state = ApiState::new(
            Pipeline::new(Arc::new(ScriptedEndpointClient::new())),
            PipelineConfig::default(),
        );
        let earlier = state
            .started
            .checked_sub(std::time::Duration::from_secs(120));
        if let Some(earlier) = earlier {
            state.started = earlier;
        }
        let response = crate::build_router(state, &[])
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let floor = if earlier.is_some() { 120 } else { 0 };
        assert!(json["uptime_secs"].as_u64().unwrap() >= floor);
    }

    #[tokio::test]
    async fn process_input_answers_in_caller_language() {
        let client = Arc::new(
            ScriptedEndpointClient::new()
                .on(Capability::Translate, |body| {
                    Ok(match body["targetlanguage"].as_str() {
                        Some("en") => json!({"data": "chest pain"}),
                        _ => json!({"data": "posible angina"}),
                    })
                })
                .reply(Capability::Search, search_ok())
                .reply(Capability::Generate, json!({"answer": "possible angina"})),
        );

        let (status, json) = post_json(
            app(client.clone()),
            "/api/process-input",
            json!({"text": "dolor de pecho", "sourceLanguage": "es"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"response": "posible angina"}));
        let search = client.last_body(Capability::Search).unwrap();
        assert_eq!(search["text"], "dolor de pecho");
        assert_eq!(search["filters"][0]["value"], "general");
    }

    #[tokio::test]
    async fn process_input_defaults_to_english() {
        let client = Arc::new(
            ScriptedEndpointClient::new()
                .reply(Capability::Search, search_ok())
                .reply(Capability::Generate, json!("rest and review")),
        );
        let (status, json) =
            post_json(app(client.clone()), "/api/process-input", json!({"text": "chest pain"}))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "rest and review");
        assert!(!client.capabilities_called().contains(&Capability::Translate));
    }

    #[tokio::test]
    async fn process_input_without_text_is_bad_request() {
        let client = Arc::new(ScriptedEndpointClient::new());
        let (status, json) =
            post_json(app(client.clone()), "/api/process-input", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("text"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_500() {
        let client = Arc::new(
            ScriptedEndpointClient::new()
                .reply(Capability::Search, search_ok())
                .fail(
                    Capability::Generate,
                    EndpointError::Timeout {
                        capability: Capability::Generate,
                        after_secs: 30,
                    },
                ),
        );
        let (status, json) =
            post_json(app(client), "/api/process-input", json!({"text": "chest pain"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn process_audio_returns_transcript_and_answer() {
        let client = Arc::new(
            ScriptedEndpointClient::new()
                .reply(
                    Capability::Speech,
                    json!({"text": "shortness of breath", "language": "en"}),
                )
                .reply(Capability::Search, search_ok())
                .reply(Capability::Generate, json!({"answer": "check oxygen saturation"})),
        );
        let (status, json) = post_json(
            app(client),
            "/api/process-audio",
            json!({"audioRef": "s3://clips/7.wav"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "transcribed": "shortness of breath",
                "response": "check oxygen saturation",
            })
        );
    }

    #[tokio::test]
    async fn process_audio_without_reference_is_bad_request() {
        let client = Arc::new(ScriptedEndpointClient::new());
        let (status, json) = post_json(
            app(client.clone()),
            "/api/process-audio",
            json!({"sourceLanguage": "es"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No audio reference provided");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn pipeline_route_returns_stage_record() {
        let client = Arc::new(
            ScriptedEndpointClient::new().reply(Capability::Generate, json!({"answer": "ok"})),
        );
        let request = PipelineRequest::text("chest pain", "en");
        let (status, json) = post_json(
            app(client),
            "/api/pipeline",
            serde_json::to_value(&request).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["answer"], "ok");
        assert!(json["stages"]["retrieval"].is_null());
        assert_eq!(json["stages"]["translation"]["status"], "success");
    }

    #[tokio::test]
    async fn pipeline_route_reports_errors_in_body() {
        let client = Arc::new(ScriptedEndpointClient::new());
        let (status, json) = post_json(
            app(client),
            "/api/pipeline",
            json!({"inputKind": "audio"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "error");
        assert_eq!(json["stages"]["inputProcessing"]["status"], "error");
    }
}
