//! Turning a pipeline run into the reply a caller sees.
//!
//! The pipeline answers in its working language. [`ResponseComposer`]
//! translates that answer back into the caller's language and, for audio
//! requests, surfaces the transcript.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use biollm_endpoint::EndpointClient;
use biollm_types::request::FALLBACK_LANGUAGE;
use biollm_types::{InputKind, PipelineRequest, PipelineResponse, StageName};

use crate::stages::{Translation, TranslationInput};

/// Caller-facing reply for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedReply {
    /// Recognized text, for audio requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcribed: Option<String>,

    /// The answer in the caller's language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Failure reason when the pipeline ended in `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComposedReply {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Builds [`ComposedReply`] values from finished runs.
#[derive(Clone)]
pub struct ResponseComposer {
    translation: Translation,
}

impl ResponseComposer {
    pub fn new(translation: Translation) -> Self {
        Self { translation }
    }

    pub fn from_client(client: Arc<dyn EndpointClient>) -> Self {
        Self::new(Translation::new(client))
    }

    pub async fn compose(
        &self,
        request: &PipelineRequest,
        response: &PipelineResponse,
    ) -> ComposedReply {
        let transcribed = match request.input_kind {
            InputKind::Audio => response
                .stage(StageName::InputProcessing)
                .filter(|s| s.is_success())
                .map(|s| s.text().to_string()),
            InputKind::Text => None,
        };

        let answer = match (&response.answer, response.is_success()) {
            (Some(answer), true) => answer,
            _ => {
                return ComposedReply {
                    transcribed,
                    response: None,
                    error: Some(
                        response
                            .message
                            .clone()
                            .unwrap_or_else(|| "pipeline failed".into()),
                    ),
                };
            }
        };

        let caller_language = caller_language(request, response);
        let reverse = self
            .translation
            .run(TranslationInput {
                text: answer,
                source_language: &request.target_language,
                target_language: caller_language,
            })
            .await;
        if !reverse.is_success() {
            warn!(
                request_id = %response.request_id,
                message = %reverse.message,
                "reply translation failed; returning untranslated answer"
            );
        }

        ComposedReply {
            transcribed,
            response: Some(reverse.text().to_string()),
            error: None,
        }
    }
}

/// The language the caller should be answered in: the ingested language
/// (detected for audio), else the supplied source language, else English.
fn caller_language<'a>(request: &'a PipelineRequest, response: &'a PipelineResponse) -> &'a str {
    response
        .stage(StageName::InputProcessing)
        .and_then(|s| s.payload.language())
        .filter(|l| !l.trim().is_empty())
        .or_else(|| request.source_language())
        .unwrap_or(FALLBACK_LANGUAGE)
}
