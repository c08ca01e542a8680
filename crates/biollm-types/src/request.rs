//! The caller's pipeline input.
//!
//! A [`PipelineRequest`] is built once per invocation and never mutated by
//! the orchestrator. [`PipelineRequest::validate`] enforces the required
//! fields before any capability is contacted.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default working language of the pipeline.
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Language assumed for audio when nothing better is known.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
/// Default nucleus-sampling threshold.
pub const DEFAULT_TOP_P: f64 = 0.9;
/// Default top-k cutoff.
pub const DEFAULT_TOP_K: u32 = 50;
/// Default answer length limit.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Kind of input the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Audio,
}

/// Options forwarded to the generation capability.
///
/// Serialized in camelCase like the request that carries it; snake_case
/// keys are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus-sampling threshold.
    #[serde(default = "default_top_p", alias = "top_p")]
    pub top_p: f64,

    /// Top-k cutoff.
    #[serde(default = "default_top_k", alias = "top_k")]
    pub top_k: u32,

    /// Maximum number of tokens to generate.
    #[serde(default = "default_max_tokens", alias = "max_tokens")]
    pub max_tokens: u32,

    /// System-prompt override. `None` keeps the built-in persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}
fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.into()
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
            context: None,
        }
    }
}

impl GenerationParams {
    /// Reject values the generation capability cannot honour.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: "temperature",
                reason: format!("must be a non-negative number, got {}", self.temperature),
            });
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ValidationError::InvalidParameter {
                name: "top_p",
                reason: format!("must be within [0, 1], got {}", self.top_p),
            });
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "max_tokens",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// The system-prompt override, ignoring blank strings.
    pub fn system_prompt_override(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// The caller's input to a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    /// Whether the request carries text or an audio reference.
    pub input_kind: InputKind,

    /// Input text (text requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Reference to the audio to transcribe (audio requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,

    /// Language of the input. Required for text, a fallback for audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,

    /// Working language for retrieval and generation.
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Explicit retrieval query. Defaults to the translated text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_query: Option<String>,

    /// Retrieval category filter. Retrieval is skipped without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_category: Option<String>,

    /// Generation options.
    #[serde(default)]
    pub generation_params: GenerationParams,
}

impl PipelineRequest {
    /// A text request in `source_language`.
    pub fn text(text: impl Into<String>, source_language: impl Into<String>) -> Self {
        Self {
            input_kind: InputKind::Text,
            text: Some(text.into()),
            audio_ref: None,
            source_language: Some(source_language.into()),
            target_language: default_target_language(),
            rag_query: None,
            rag_category: None,
            generation_params: GenerationParams::default(),
        }
    }

    /// An audio request for the recording at `audio_ref`.
    pub fn audio(audio_ref: impl Into<String>) -> Self {
        Self {
            input_kind: InputKind::Audio,
            text: None,
            audio_ref: Some(audio_ref.into()),
            source_language: None,
            target_language: default_target_language(),
            rag_query: None,
            rag_category: None,
            generation_params: GenerationParams::default(),
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    /// Enable retrieval for `category`.
    pub fn with_rag_category(mut self, category: impl Into<String>) -> Self {
        self.rag_category = Some(category.into());
        self
    }

    pub fn with_rag_query(mut self, query: impl Into<String>) -> Self {
        self.rag_query = Some(query.into());
        self
    }

    pub fn with_generation_params(mut self, params: GenerationParams) -> Self {
        self.generation_params = params;
        self
    }

    /// The retrieval category, if one was supplied and is not blank.
    pub fn rag_category(&self) -> Option<&str> {
        non_blank(self.rag_category.as_deref())
    }

    /// The explicit retrieval query, if one was supplied and is not blank.
    pub fn rag_query(&self) -> Option<&str> {
        non_blank(self.rag_query.as_deref())
    }

    /// The caller-supplied source language, if not blank.
    pub fn source_language(&self) -> Option<&str> {
        non_blank(self.source_language.as_deref())
    }

    /// Check required fields and generation parameters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.input_kind {
            InputKind::Text => {
                if non_blank(self.text.as_deref()).is_none() {
                    return Err(ValidationError::MissingText);
                }
                if self.source_language().is_none() {
                    return Err(ValidationError::MissingSourceLanguage);
                }
            }
            InputKind::Audio => {
                if non_blank(self.audio_ref.as_deref()).is_none() {
                    return Err(ValidationError::MissingAudioRef);
                }
            }
        }
        if self.target_language.trim().is_empty() {
            return Err(ValidationError::MissingTargetLanguage);
        }
        self.generation_params.validate()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 1.0);
        assert_eq!(params.top_p, 0.9);
        assert_eq!(params.top_k, 50);
        assert_eq!(params.max_tokens, 100);
        assert!(params.context.is_none());
    }

    #[test]
    fn deserialize_minimal_text_request() {
        let json = r#"{"inputKind": "text", "text": "chest pain", "sourceLanguage": "en"}"#;
        let req: PipelineRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.input_kind, InputKind::Text);
        assert_eq!(req.target_language, "en");
        assert!(req.rag_category().is_none());
        assert_eq!(req.generation_params, GenerationParams::default());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn generation_params_accept_snake_case_aliases() {
        let json = r#"{"temperature": 0.2, "top_p": 0.5, "top_k": 10, "max_tokens": 256}"#;
        let params: GenerationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.top_p, 0.5);
        assert_eq!(params.top_k, 10);
        assert_eq!(params.max_tokens, 256);
    }

    #[test]
    fn request_serializes_camel_case_throughout() {
        let req = PipelineRequest::text("fever", "es").with_generation_params(GenerationParams {
            max_tokens: 256,
            ..Default::default()
        });
        let value = serde_json::to_value(&req).unwrap();
        let params = &value["generationParams"];
        assert_eq!(params["topP"], 0.9);
        assert_eq!(params["topK"], 50);
        assert_eq!(params["maxTokens"], 256);
        assert!(params.get("max_tokens").is_none());

        let back: PipelineRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back.generation_params, req.generation_params);
    }

    #[test]
    fn blank_target_language_rejected() {
        let json = r#"{"inputKind": "text", "text": "fever", "sourceLanguage": "es", "targetLanguage": ""}"#;
        let req: PipelineRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.validate(), Err(ValidationError::MissingTargetLanguage));
    }

    #[test]
    fn text_request_requires_text() {
        let req = PipelineRequest::text("   ", "en");
        assert_eq!(req.validate(), Err(ValidationError::MissingText));
    }

    #[test]
    fn text_request_requires_source_language() {
        let mut req = PipelineRequest::text("fever", "en");
        req.source_language = None;
        assert_eq!(req.validate(), Err(ValidationError::MissingSourceLanguage));
    }

    #[test]
    fn audio_request_requires_audio_ref() {
        let mut req = PipelineRequest::audio("clip.wav");
        assert!(req.validate().is_ok());
        req.audio_ref = Some(String::new());
        assert_eq!(req.validate(), Err(ValidationError::MissingAudioRef));
    }

    #[test]
    fn audio_request_does_not_need_source_language() {
        let req = PipelineRequest::audio("https://example.com/clip.wav");
        assert!(req.source_language().is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_rag_category_is_absent() {
        let req = PipelineRequest::text("fever", "en").with_rag_category("  ");
        assert!(req.rag_category().is_none());
    }

    #[test]
    fn out_of_range_top_p_rejected() {
        let params = GenerationParams {
            top_p: 1.5,
            ..Default::default()
        };
        let req = PipelineRequest::text("fever", "en").with_generation_params(params);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvalidParameter { name: "top_p", .. })
        ));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let params = GenerationParams {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn blank_system_prompt_override_ignored() {
        let params = GenerationParams {
            context: Some(" ".into()),
            ..Default::default()
        };
        assert!(params.system_prompt_override().is_none());
    }
}
