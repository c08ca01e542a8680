//! Input ingestion: text passthrough or speech-to-text.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use biollm_endpoint::{Capability, EndpointClient};
use biollm_types::request::FALLBACK_LANGUAGE;
use biollm_types::{InputKind, PipelineRequest, StagePayload, StageResult};

use super::{SpeechReply, check_envelope_status, coerce_text};

/// First stage of every run.
///
/// Validates the request, then either echoes the supplied text or
/// transcribes the referenced audio. A validation failure or a failed
/// transcription produces an `Error` result, which aborts the run.
#[derive(Clone)]
pub struct InputIngestion {
    client: Arc<dyn EndpointClient>,
}

impl InputIngestion {
    pub fn new(client: Arc<dyn EndpointClient>) -> Self {
        Self { client }
    }

    pub async fn run(&self, request: &PipelineRequest) -> StageResult {
        let fallback = request.source_language().unwrap_or(FALLBACK_LANGUAGE);

        if let Err(e) = request.validate() {
            warn!(error = %e, "request rejected");
            return StageResult::error(
                StagePayload::Input {
                    text: request.text.clone().unwrap_or_default(),
                    language: fallback.to_string(),
                },
                format!("validation failed: {e}"),
            );
        }

        match request.input_kind {
            InputKind::Text => {
                let text = request.text.clone().unwrap_or_default();
                StageResult::success(
                    StagePayload::Input {
                        text,
                        language: fallback.to_string(),
                    },
                    "text input accepted",
                )
            }
            InputKind::Audio => {
                let audio_ref = request.audio_ref.as_deref().unwrap_or_default();
                self.transcribe(audio_ref, fallback).await
            }
        }
    }

    async fn transcribe(&self, audio_ref: &str, fallback: &str) -> StageResult {
        let body = json!({ "source_audio": audio_ref });

        let reply = match self.client.invoke(Capability::Speech, &body).await {
            Ok(reply) => reply,
            Err(e) => {
                return StageResult::error(
                    StagePayload::Input {
                        text: String::new(),
                        language: fallback.to_string(),
                    },
                    format!("speech recognition failed: {e}"),
                );
            }
        };

        let decoded = match serde_json::from_value::<SpeechReply>(reply) {
            Ok(SpeechReply::Transcript {
                text,
                language,
                status,
            }) => check_envelope_status(status.as_deref()).map(|()| (text, language)),
            Ok(SpeechReply::Envelope {
                data,
                status,
                language,
            }) => check_envelope_status(status.as_deref()).map(|()| (coerce_text(&data), language)),
            Ok(SpeechReply::Raw(value)) => Ok((coerce_text(&value), None)),
            Err(e) => Err(format!("undecodable reply: {e}")),
        };

        match decoded {
            Ok((text, detected)) => {
                let language = detected
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .unwrap_or(fallback)
                    .to_string();
                debug!(language = %language, chars = text.len(), "audio transcribed");
                let message = format!("transcribed audio ({language})");
                StageResult::success(StagePayload::Input { text, language }, message)
            }
            Err(reason) => StageResult::error(
                StagePayload::Input {
                    text: String::new(),
                    language: fallback.to_string(),
                },
                format!("speech recognition failed: {reason}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biollm_endpoint::{EndpointError, ScriptedEndpointClient};
    use biollm_types::StageStatus;

    fn ingestion(client: ScriptedEndpointClient) -> (InputIngestion, Arc<ScriptedEndpointClient>) {
        let client = Arc::new(client);
        (InputIngestion::new(client.clone()), client)
    }

    #[tokio::test]
    async fn text_input_is_echoed() {
        let (stage, client) = ingestion(ScriptedEndpointClient::new());
        let result = stage.run(&PipelineRequest::text("chest pain", "en")).await;
        assert!(result.is_success());
        assert_eq!(
            result.payload,
            StagePayload::Input {
                text: "chest pain".into(),
                language: "en".into(),
            }
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_text_fails_validation_without_calls() {
        let (stage, client) = ingestion(ScriptedEndpointClient::new());
        let result = stage.run(&PipelineRequest::text("   ", "en")).await;
        assert_eq!(result.status, StageStatus::Error);
        assert!(result.message.starts_with("validation failed"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn audio_uses_detected_language() {
        let (stage, client) = ingestion(
            ScriptedEndpointClient::new().reply(
                Capability::Speech,
                json!({"text": "me duele el pecho", "language": "es"}),
            ),
        );
        let request = PipelineRequest::audio("s3://clips/1.wav").with_source_language("fr");
        let result = stage.run(&request).await;

        assert!(result.is_success());
        assert_eq!(result.text(), "me duele el pecho");
        assert_eq!(result.payload.language(), Some("es"));
        assert_eq!(
            client.last_body(Capability::Speech),
            Some(json!({"source_audio": "s3://clips/1.wav"}))
        );
    }

    #[tokio::test]
    async fn audio_without_detection_falls_back_to_caller_language() {
        let (stage, _) = ingestion(
            ScriptedEndpointClient::new().reply(Capability::Speech, json!({"data": "dolor"})),
        );
        let request = PipelineRequest::audio("clip.wav").with_source_language("es");
        let result = stage.run(&request).await;
        assert_eq!(result.text(), "dolor");
        assert_eq!(result.payload.language(), Some("es"));
    }

    #[tokio::test]
    async fn audio_raw_reply_defaults_to_english() {
        let (stage, _) = ingestion(
            ScriptedEndpointClient::new().reply(Capability::Speech, json!("short of breath")),
        );
        let result = stage.run(&PipelineRequest::audio("clip.wav")).await;
        assert_eq!(result.text(), "short of breath");
        assert_eq!(result.payload.language(), Some("en"));
    }

    #[tokio::test]
    async fn empty_transcript_is_success() {
        let (stage, _) =
            ingestion(ScriptedEndpointClient::new().reply(Capability::Speech, json!("")));
        let result = stage.run(&PipelineRequest::audio("silence.wav")).await;
        assert!(result.is_success());
        assert_eq!(result.text(), "");
    }

    #[tokio::test]
    async fn transport_error_keeps_fallback_language() {
        let (stage, _) = ingestion(ScriptedEndpointClient::new().fail(
            Capability::Speech,
            EndpointError::Network {
                capability: Capability::Speech,
                message: "connection reset".into(),
            },
        ));
        let request = PipelineRequest::audio("clip.wav").with_source_language("de");
        let result = stage.run(&request).await;

        assert_eq!(result.status, StageStatus::Error);
        assert_eq!(result.text(), "");
        assert_eq!(result.payload.language(), Some("de"));
        assert!(result.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn failed_envelope_status_is_error() {
        let (stage, _) = ingestion(ScriptedEndpointClient::new().reply(
            Capability::Speech,
            json!({"status": "FAILED", "data": ""}),
        ));
        let result = stage.run(&PipelineRequest::audio("clip.wav")).await;
        assert_eq!(result.status, StageStatus::Error);
        assert!(result.message.contains("FAILED"));
    }

    #[tokio::test]
    async fn failed_status_on_transcript_is_error() {
        let (stage, _) = ingestion(ScriptedEndpointClient::new().reply(
            Capability::Speech,
            json!({"status": "FAILED", "text": "", "language": "es"}),
        ));
        let request = PipelineRequest::audio("clip.wav").with_source_language("de");
        let result = stage.run(&request).await;
        assert_eq!(result.status, StageStatus::Error);
        assert_eq!(result.payload.language(), Some("de"));
        assert!(result.message.contains("FAILED"));
    }
}
