//! Error types for biollm.
//!
//! [`BiollmError`] is the crate-level error for configuration and I/O
//! failures. [`ValidationError`] describes a malformed
//! [`PipelineRequest`](crate::request::PipelineRequest); it is fatal for the
//! request and is raised before any external capability is contacted.

use thiserror::Error;

/// Top-level error type for biollm.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BiollmError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A pipeline request failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A required request field is missing or a parameter is out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text input without any text.
    #[error("text input requires a non-empty `text`")]
    MissingText,

    /// Text input without a source language.
    #[error("text input requires `sourceLanguage`")]
    MissingSourceLanguage,

    /// Audio input without an audio reference.
    #[error("audio input requires `audioRef`")]
    MissingAudioRef,

    /// A blank target language.
    #[error("`targetLanguage` must not be empty")]
    MissingTargetLanguage,

    /// A generation parameter is outside its accepted range.
    #[error("generation parameter `{name}` {reason}")]
    InvalidParameter {
        /// Parameter name as it appears on the wire.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BiollmError>;
