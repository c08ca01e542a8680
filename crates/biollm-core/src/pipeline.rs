//! The pipeline orchestrator.
//!
//! [`Pipeline`] sequences the stage adapters for one request:
//!
//! ```text
//! Start -> InputProcessed -> Translated -> (Retrieved) -> Generated -> {Success, Error}
//! ```
//!
//! Only two stage failures end a run: input ingestion (nothing else is
//! contacted) and generation (there is no answer). Translation and
//! retrieval failures are recorded and the run continues with the
//! original text or without context. Cancellation and panics during
//! sequencing also end the run in `Error`; in every case the caller gets a
//! well-formed [`PipelineResponse`] holding the stages recorded so far.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use biollm_endpoint::EndpointClient;
use biollm_types::request::FALLBACK_LANGUAGE;
use biollm_types::{PipelineRequest, PipelineResponse, StageName, StageResult};

use crate::composer::ResponseComposer;
use crate::stages::{
    Generation, GenerationInput, InputIngestion, Retrieval, RetrievalInput, Translation,
    TranslationInput,
};

/// Runs requests through the four stages.
///
/// Cheap to share: all adapters hold the same `Arc<dyn EndpointClient>`,
/// and a run keeps its state on its own stack, so one `Pipeline` can serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    client: Arc<dyn EndpointClient>,
    ingestion: InputIngestion,
    translation: Translation,
    retrieval: Retrieval,
    generation: Generation,
}

impl Pipeline {
    pub fn new(client: Arc<dyn EndpointClient>) -> Self {
        Self {
            ingestion: InputIngestion::new(client.clone()),
            translation: Translation::new(client.clone()),
            retrieval: Retrieval::new(client.clone()),
            generation: Generation::new(client.clone()),
            client,
        }
    }

    /// Name of the underlying endpoint client.
    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// A composer that shares this pipeline's endpoint client.
    pub fn composer(&self) -> ResponseComposer {
        ResponseComposer::new(self.translation.clone())
    }

    /// Run `request` to completion.
    pub async fn run(&self, request: &PipelineRequest) -> PipelineResponse {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Run `request`, stopping early if `cancel` fires.
    ///
    /// A stage that is in flight when the token fires is dropped and its
    /// result discarded.
    pub async fn run_with_cancel(
        &self,
        request: &PipelineRequest,
        cancel: CancellationToken,
    ) -> PipelineResponse {
        let mut response = PipelineResponse::new();
        let span = info_span!(
            "pipeline",
            request_id = %response.request_id,
            input = ?request.input_kind
        );
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.sequence(request, &cancel, &mut response))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        if let Err(panic) = outcome {
            let reason = panic_message(panic.as_ref());
            span.in_scope(|| error!(reason = %reason, "pipeline panicked"));
            response.fail(format!("pipeline failed: internal fault: {reason}"));
        }

        response.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.in_scope(|| {
            info!(
                status = ?response.status,
                stages = response.stages.len(),
                elapsed_ms = response.elapsed_ms,
                "pipeline finished"
            )
        });
        response
    }

    async fn sequence(
        &self,
        request: &PipelineRequest,
        cancel: &CancellationToken,
        response: &mut PipelineResponse,
    ) {
        // Start -> InputProcessed
        let Some(input) = step(
            StageName::InputProcessing,
            cancel,
            response,
            self.ingestion.run(request),
        )
        .await
        else {
            return;
        };
        if !input.is_success() {
            error!(message = %input.message, "input processing failed");
            response.fail(format!("input processing failed: {}", input.message));
            return;
        }
        let language = input
            .payload
            .language()
            .unwrap_or(FALLBACK_LANGUAGE)
            .to_string();

        // InputProcessed -> Translated
        let Some(translation) = step(
            StageName::Translation,
            cancel,
            response,
            self.translation.run(TranslationInput {
                text: input.text(),
                source_language: &language,
                target_language: &request.target_language,
            }),
        )
        .await
        else {
            return;
        };
        let working_text = translation.text().to_string();

        // Translated -> Retrieved, only when a category was given
        let mut context = String::new();
        if let Some(category) = request.rag_category() {
            let query = request.rag_query().unwrap_or(&working_text);
            let Some(retrieval) = step(
                StageName::Retrieval,
                cancel,
                response,
                self.retrieval.run(RetrievalInput { query, category }),
            )
            .await
            else {
                return;
            };
            if retrieval.is_success() {
                context = retrieval.text().to_string();
            }
        }

        // -> Generated
        let Some(generation) = step(
            StageName::Generation,
            cancel,
            response,
            self.generation.run(GenerationInput {
                text: &working_text,
                context: Some(context.as_str()),
                params: &request.generation_params,
            }),
        )
        .await
        else {
            return;
        };

        if generation.is_success() {
            response.succeed(generation.text().to_string(), "pipeline completed successfully");
        } else {
            error!(message = %generation.message, "generation failed");
            response.fail(generation.message.clone());
        }
    }
}

/// Run one stage unless cancelled, and record its result.
///
/// Returns `None` (after marking the response failed) when the token fired
/// before or during the stage.
async fn step<F>(
    stage: StageName,
    cancel: &CancellationToken,
    response: &mut PipelineResponse,
    fut: F,
) -> Option<StageResult>
where
    F: Future<Output = StageResult>,
{
    if cancel.is_cancelled() {
        warn!(stage = %stage, "cancelled before stage");
        response.fail(format!("pipeline cancelled before {stage}"));
        return None;
    }

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(stage = %stage, "cancelled during stage");
            response.fail(format!("pipeline cancelled during {stage}"));
            return None;
        }
        result = fut => result,
    };

    if result.is_success() {
        info!(stage = %stage, message = %result.message, "stage succeeded");
    } else {
        warn!(stage = %stage, message = %result.message, "stage failed");
    }
    response.record(stage, result.clone());
    Some(result)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
