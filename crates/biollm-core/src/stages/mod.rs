//! Stage adapters.
//!
//! Each adapter wraps one capability: it builds the wire request, invokes
//! the shared [`EndpointClient`](biollm_endpoint::EndpointClient), decodes
//! the reply and reports a [`StageResult`](biollm_types::StageResult).
//! Endpoint errors never escape an adapter; they become `Error` results
//! carrying a degraded payload.
//!
//! Replies are decoded through a per-capability `untagged` enum tried in
//! order: the structured shape, then the `{"data": ...}` envelope, then the
//! raw value coerced to text.

pub mod generation;
pub mod ingestion;
pub mod retrieval;
pub mod translation;

pub use generation::{Generation, GenerationInput};
pub use ingestion::InputIngestion;
pub use retrieval::{Retrieval, RetrievalInput};
pub use translation::{Translation, TranslationInput};

use serde::Deserialize;
use serde_json::Value;

/// Render an opaque reply value as text.
///
/// Strings pass through, `null` becomes empty, a nested `data` field is
/// unwrapped, arrays are joined line by line and anything else is rendered
/// as compact JSON.
pub(crate) fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => match map.get("data") {
            Some(inner) => coerce_text(inner),
            None => value.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Reject a reply whose `status` field reports a non-success state.
pub(crate) fn check_envelope_status(status: Option<&str>) -> Result<(), String> {
    match status {
        Some(s) if !s.eq_ignore_ascii_case("SUCCESS") => {
            Err(format!("capability reported status {s}"))
        }
        _ => Ok(()),
    }
}

// ── Reply shapes ─────────────────────────────────────────────────────────

/// Speech recognition reply.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SpeechReply {
    Transcript {
        text: String,
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        status: Option<String>,
    },
    Envelope {
        data: Value,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        language: Option<String>,
    },
    Raw(Value),
}

/// Machine translation reply.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TranslateReply {
    Translated {
        #[serde(rename = "translatedText", alias = "translated_text")]
        translated_text: String,
        #[serde(default)]
        status: Option<String>,
    },
    Envelope {
        data: Value,
        #[serde(default)]
        status: Option<String>,
    },
    Raw(Value),
}

/// RAG search reply. Only this shape is accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchReply {
    pub status: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub data: Value,
}

/// Generation reply.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GenerateReply {
    Answer {
        answer: String,
        #[serde(default)]
        status: Option<String>,
    },
    Envelope {
        data: Value,
        #[serde(default)]
        status: Option<String>,
    },
    Raw(Value),
}
