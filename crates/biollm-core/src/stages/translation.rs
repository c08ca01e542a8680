//! Machine translation into (or back out of) the working language.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use biollm_endpoint::{Capability, EndpointClient};
use biollm_types::{StagePayload, StageResult};

use super::{TranslateReply, check_envelope_status, coerce_text};

/// Text to translate and the language pair.
#[derive(Debug, Clone, Copy)]
pub struct TranslationInput<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
}

/// Returns `true` when translating from `source` to `target` is a no-op.
pub fn is_identity(source: &str, target: &str) -> bool {
    source.trim().eq_ignore_ascii_case(target.trim())
}

/// Translation stage.
///
/// Skips the call when the languages match or there is nothing to
/// translate. On failure the payload carries the original text so later
/// stages can keep going.
#[derive(Clone)]
pub struct Translation {
    client: Arc<dyn EndpointClient>,
}

impl Translation {
    pub fn new(client: Arc<dyn EndpointClient>) -> Self {
        Self { client }
    }

    pub async fn run(&self, input: TranslationInput<'_>) -> StageResult {
        let passthrough = || StagePayload::Translation {
            translated_text: input.text.to_string(),
        };

        if is_identity(input.source_language, input.target_language) {
            return StageResult::success(passthrough(), "no translation needed");
        }
        if input.text.trim().is_empty() {
            return StageResult::success(passthrough(), "nothing to translate");
        }

        let body = json!({
            "text": input.text,
            "sourcelanguage": input.source_language,
            "targetlanguage": input.target_language,
        });

        let reply = match self.client.invoke(Capability::Translate, &body).await {
            Ok(reply) => reply,
            Err(e) => {
                return StageResult::error(passthrough(), format!("translation failed: {e}"));
            }
        };

        let decoded = match serde_json::from_value::<TranslateReply>(reply) {
            Ok(TranslateReply::Translated {
                translated_text,
                status,
            }) => check_envelope_status(status.as_deref()).map(|()| translated_text),
            Ok(TranslateReply::Envelope { data, status }) => {
                check_envelope_status(status.as_deref()).map(|()| coerce_text(&data))
            }
            Ok(TranslateReply::Raw(value)) => Ok(coerce_text(&value)),
            Err(e) => Err(format!("undecodable reply: {e}")),
        };

        match decoded {
            Ok(text) if text.trim().is_empty() => StageResult::error(
                passthrough(),
                "translation failed: capability returned empty text",
            ),
            Ok(translated_text) => {
                debug!(
                    from = input.source_language,
                    to = input.target_language,
                    "text translated"
                );
                StageResult::success(
                    StagePayload::Translation { translated_text },
                    format!(
                        "translated {} -> {}",
                        input.source_language, input.target_language
                    ),
                )
            }
            Err(reason) => StageResult::error(passthrough(), format!("translation failed: {reason}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biollm_endpoint::{EndpointError, ScriptedEndpointClient};
    use biollm_types::StageStatus;

    fn input<'a>(text: &'a str, source: &'a str, target: &'a str) -> TranslationInput<'a> {
        TranslationInput {
            text,
            source_language: source,
            target_language: target,
        }
    }

    #[test]
    fn identity_ignores_case_and_whitespace() {
        assert!(is_identity("en", "EN "));
        assert!(!is_identity("es", "en"));
    }

    #[tokio::test]
    async fn same_language_skips_the_call() {
        let client = Arc::new(ScriptedEndpointClient::new());
        let stage = Translation::new(client.clone());
        let result = stage.run(input("chest pain", "en", "en")).await;
        assert!(result.is_success());
        assert_eq!(result.text(), "chest pain");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_text_skips_the_call() {
        let client = Arc::new(ScriptedEndpointClient::new());
        let stage = Translation::new(client.clone());
        let result = stage.run(input("", "es", "en")).await;
        assert!(result.is_success());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn sends_wire_shape_and_decodes_envelope() {
        let client = Arc::new(
            ScriptedEndpointClient::new().reply(Capability::Translate, json!({"data": "chest pain"})),
        );
        let stage = Translation::new(client.clone());
        let result = stage.run(input("dolor de pecho", "es", "en")).await;

        assert!(result.is_success());
        assert_eq!(result.text(), "chest pain");
        assert_eq!(
            client.last_body(Capability::Translate),
            Some(json!({
                "text": "dolor de pecho",
                "sourcelanguage": "es",
                "targetlanguage": "en",
            }))
        );
    }

    #[tokio::test]
    async fn structured_reply_is_preferred() {
        let client = Arc::new(
            ScriptedEndpointClient::new()
                .reply(Capability::Translate, json!({"translatedText": "fever"})),
        );
        let result = Translation::new(client).run(input("fiebre", "es", "en")).await;
        assert_eq!(result.text(), "fever");
    }

    #[tokio::test]
    async fn failure_carries_original_text() {
        let client = Arc::new(ScriptedEndpointClient::new().fail(
            Capability::Translate,
            EndpointError::Timeout {
                capability: Capability::Translate,
                after_secs: 30,
            },
        ));
        let result = Translation::new(client).run(input("fiebre", "es", "en")).await;
        assert_eq!(result.status, StageStatus::Error);
        assert_eq!(result.text(), "fiebre");
        assert!(result.message.contains("timed out"));
    }

    #[tokio::test]
    async fn empty_translation_is_error_with_original_text() {
        let client =
            Arc::new(ScriptedEndpointClient::new().reply(Capability::Translate, json!({"data": ""})));
        let result = Translation::new(client).run(input("fiebre", "es", "en")).await;
        assert_eq!(result.status, StageStatus::Error);
        assert_eq!(result.text(), "fiebre");
    }

    #[tokio::test]
    async fn failed_status_on_structured_reply_is_error() {
        let client = Arc::new(ScriptedEndpointClient::new().reply(
            Capability::Translate,
            json!({"status": "FAILED", "translatedText": "fever"}),
        ));
        let result = Translation::new(client).run(input("fiebre", "es", "en")).await;
        assert_eq!(result.status, StageStatus::Error);
        assert_eq!(result.text(), "fiebre");
        assert!(result.message.contains("FAILED"));
    }
}
