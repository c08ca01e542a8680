//! Answer generation by the biomedical model.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use biollm_endpoint::{Capability, EndpointClient};
use biollm_types::{GenerationParams, StagePayload, StageResult};

use super::{GenerateReply, check_envelope_status, coerce_text};

/// System prompt sent when the request does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert and experienced from the healthcare and biomedical domain with extensive medical knowledge and practical experience. Your name is OpenBioLLM, and you were developed by Saama AI Labs. who's willing to help answer the user's query with explanation. In your explanation, leverage your deep medical expertise such as relevant anatomical structures, physiological processes, diagnostic criteria, treatment guidelines, or other pertinent medical concepts. Use precise medical terminology while still aiming to make the explanation clear and accessible to a general audience.";

/// Separates the question from retrieved context in the prompt.
pub const CONTEXT_HEADER: &str = "Additional context:";

/// Question, optional retrieved context and sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub text: &'a str,
    pub context: Option<&'a str>,
    pub params: &'a GenerationParams,
}

/// Build the prompt: the question, followed by the context block when
/// there is any.
pub fn build_prompt(text: &str, context: Option<&str>) -> String {
    match context.filter(|c| !c.trim().is_empty()) {
        Some(ctx) => format!("{text}\n\n{CONTEXT_HEADER} {ctx}"),
        None => text.to_string(),
    }
}

/// Generation stage. Its failure is the pipeline's terminal failure.
#[derive(Clone)]
pub struct Generation {
    client: Arc<dyn EndpointClient>,
}

impl Generation {
    pub fn new(client: Arc<dyn EndpointClient>) -> Self {
        Self { client }
    }

    pub async fn run(&self, input: GenerationInput<'_>) -> StageResult {
        let prompt = build_prompt(input.text, input.context);
        let body = request_body(&prompt, input.params);

        let failed = |prompt: String, reason: String| {
            StageResult::error(
                StagePayload::Generation {
                    prompt,
                    answer: None,
                },
                format!("generation failed: {reason}"),
            )
        };

        let reply = match self.client.invoke(Capability::Generate, &body).await {
            Ok(reply) => reply,
            Err(e) => return failed(prompt, e.to_string()),
        };

        let decoded = match serde_json::from_value::<GenerateReply>(reply) {
            Ok(GenerateReply::Answer { answer, status }) => {
                check_envelope_status(status.as_deref()).map(|()| answer)
            }
            Ok(GenerateReply::Envelope { data, status }) => {
                check_envelope_status(status.as_deref()).map(|()| coerce_text(&data))
            }
            Ok(GenerateReply::Raw(value)) => Ok(coerce_text(&value)),
            Err(e) => Err(format!("undecodable reply: {e}")),
        };

        match decoded {
            Ok(answer) if answer.trim().is_empty() => {
                failed(prompt, "capability returned an empty answer".into())
            }
            Ok(answer) => {
                debug!(
                    prompt_chars = prompt.len(),
                    answer_chars = answer.len(),
                    "answer generated"
                );
                StageResult::success(
                    StagePayload::Generation {
                        prompt,
                        answer: Some(answer),
                    },
                    "answer generated",
                )
            }
            Err(reason) => failed(prompt, reason),
        }
    }
}

/// Wire body for the generation capability. Numbers travel as strings.
fn request_body(prompt: &str, params: &GenerationParams) -> Value {
    json!({
        "data": prompt,
        "temperature": format!("{:?}", params.temperature),
        "top_p": format!("{:?}", params.top_p),
        "top_k": params.top_k.to_string(),
        "max_tokens": params.max_tokens.to_string(),
        "context": params.system_prompt_override().unwrap_or(DEFAULT_SYSTEM_PROMPT),
    })
}
