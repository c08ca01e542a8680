//! The canonical per-stage outcome record.
//!
//! Every pipeline stage, whatever capability it wraps, reports back a
//! [`StageResult`]. A stage that fails internally still produces one, with
//! [`StageStatus::Error`] and a non-empty diagnostic message, so callers
//! never see a raw transport fault.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic used when a stage fails without saying why.
const UNSPECIFIED_FAILURE: &str = "stage failed without a diagnostic";

/// Pipeline stages in execution order.
///
/// The derived `Ord` follows declaration order, so a `BTreeMap` keyed by
/// `StageName` iterates stages in the order they ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageName {
    /// Text passthrough or speech-to-text.
    InputProcessing,
    /// Machine translation into the working language.
    Translation,
    /// Category-filtered RAG search.
    Retrieval,
    /// Answer generation by the biomedical model.
    Generation,
}

impl StageName {
    /// Wire name of the stage (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputProcessing => "inputProcessing",
            Self::Translation => "translation",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Success,
    Error,
}

/// Stage-specific data carried by a [`StageResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StagePayload {
    /// Recognized (or passed-through) text and its language.
    Input {
        /// The input text; empty when speech recognition failed.
        text: String,
        /// Language code of `text`.
        language: String,
    },

    /// Text in the working language.
    Translation {
        /// The translated text, or the original text when translation was
        /// skipped or failed.
        #[serde(rename = "translatedText")]
        translated_text: String,
    },

    /// Supporting context fetched from the RAG search.
    Retrieval {
        /// Retrieved context; empty when retrieval failed.
        context: String,
    },

    /// The generated answer.
    Generation {
        /// The exact prompt sent to the generation capability.
        prompt: String,
        /// The answer; `None` when generation failed.
        answer: Option<String>,
    },
}

impl StagePayload {
    /// The primary text value of the payload.
    ///
    /// Input text, translated text, retrieved context, or the answer
    /// (empty when there is none).
    pub fn text(&self) -> &str {
        match self {
            Self::Input { text, .. } => text,
            Self::Translation { translated_text } => translated_text,
            Self::Retrieval { context } => context,
            Self::Generation { answer, .. } => answer.as_deref().unwrap_or(""),
        }
    }

    /// Language of an input payload; `None` for every other stage.
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Input { language, .. } => Some(language),
            _ => None,
        }
    }
}

/// Canonical output of every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Whether the stage succeeded.
    pub status: StageStatus,
    /// Stage-specific data; present on failure too (degraded defaults).
    pub payload: StagePayload,
    /// Human-readable diagnostic. Never empty.
    pub message: String,
}

impl StageResult {
    /// A successful stage outcome.
    pub fn success(payload: StagePayload, message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Success,
            payload,
            message: non_empty(message.into()),
        }
    }

    /// A failed stage outcome carrying the degraded payload.
    pub fn error(payload: StagePayload, message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Error,
            payload,
            message: non_empty(message.into()),
        }
    }

    /// Returns `true` when the stage succeeded.
    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }

    /// Shorthand for [`StagePayload::text`].
    pub fn text(&self) -> &str {
        self.payload.text()
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        UNSPECIFIED_FAILURE.to_string()
    } else {
        message
    }
}
