//! Configuration schema.
//!
//! All structs accept both `snake_case` and `camelCase` keys via
//! `#[serde(alias)]`, and every field has a default so an empty JSON
//! object is a valid config. Unknown fields are ignored.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BiollmError, Result};
use crate::request::{DEFAULT_TARGET_LANGUAGE, GenerationParams};
use crate::secret::ApiKey;

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for biollm.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Capability endpoints and credentials.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Defaults applied to requests built by the API and CLI.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// HTTP API server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Check the fields the endpoint client cannot work without.
    pub fn validate(&self) -> Result<()> {
        self.endpoints.validate()?;
        if self.pipeline.target_language.trim().is_empty() {
            return Err(BiollmError::ConfigInvalid {
                reason: "pipeline.target_language must not be empty".into(),
            });
        }
        self.pipeline
            .generation
            .validate()
            .map_err(|e| BiollmError::ConfigInvalid {
                reason: format!("pipeline.generation: {e}"),
            })
    }
}

// ── Endpoints ────────────────────────────────────────────────────────────

/// How to reach the four hosted capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Base URL; each capability is served at `{base_url}/{model_id}`.
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,

    /// Credential for the hosted capabilities.
    #[serde(default, alias = "apiKey")]
    pub api_key: ApiKey,

    /// Environment variable consulted when `api_key` is empty.
    #[serde(default = "default_api_key_env", alias = "apiKeyEnv")]
    pub api_key_env: String,

    /// Header that carries the credential.
    #[serde(default = "default_auth_header", alias = "authHeader")]
    pub auth_header: String,

    /// Per-call timeout, applied to every capability.
    #[serde(default = "default_timeout_secs", alias = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Extra headers sent on every call.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Model id of each capability.
    #[serde(default)]
    pub models: CapabilityModels,
}

fn default_base_url() -> String {
    "https://models.aixplain.com/api/v1/execute".into()
}
fn default_api_key_env() -> String {
    "BIOLLM_API_KEY".into()
}
fn default_auth_header() -> String {
    "x-api-key".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: ApiKey::default(),
            api_key_env: default_api_key_env(),
            auth_header: default_auth_header(),
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
            models: CapabilityModels::default(),
        }
    }
}

impl EndpointsConfig {
    /// The per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, or the one in `api_key_env` if none is set.
    pub fn resolved_api_key(&self) -> ApiKey {
        self.api_key.clone().or_env(&self.api_key_env)
    }

    fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(BiollmError::ConfigInvalid {
                reason: format!("endpoints.base_url must be an http(s) URL, got '{base}'"),
            });
        }
        if self.timeout_secs == 0 {
            return Err(BiollmError::ConfigInvalid {
                reason: "endpoints.timeout_secs must be greater than zero".into(),
            });
        }
        if self.auth_header.trim().is_empty() {
            return Err(BiollmError::ConfigInvalid {
                reason: "endpoints.auth_header must not be empty".into(),
            });
        }
        for (name, id) in self.models.entries() {
            if id.trim().is_empty() {
                return Err(BiollmError::ConfigInvalid {
                    reason: format!("endpoints.models.{name} must not be empty"),
                });
            }
        }
        Ok(())
    }
}

/// Hosted model id for each capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityModels {
    /// Speech recognizer.
    #[serde(default = "default_speech_model")]
    pub speech: String,

    /// Machine translator.
    #[serde(default = "default_translate_model")]
    pub translate: String,

    /// RAG search agent.
    #[serde(default = "default_search_model")]
    pub search: String,

    /// Biomedical generation model.
    #[serde(default = "default_generate_model")]
    pub generate: String,
}

fn default_speech_model() -> String {
    "6610617ff1278441b6482530".into()
}
fn default_translate_model() -> String {
    "66a7e086f12784226d54d4a7".into()
}
fn default_search_model() -> String {
    "67df1bd1181c58b7238eb7dd".into()
}
fn default_generate_model() -> String {
    "677c18696eb5634c19191911".into()
}

impl Default for CapabilityModels {
    fn default() -> Self {
        Self {
            speech: default_speech_model(),
            translate: default_translate_model(),
            search: default_search_model(),
            generate: default_generate_model(),
        }
    }
}

impl CapabilityModels {
    fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("speech", &self.speech),
            ("translate", &self.translate),
            ("search", &self.search),
            ("generate", &self.generate),
        ]
    }
}

// ── Pipeline defaults ────────────────────────────────────────────────────

/// Defaults for requests assembled by the API handlers and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Working language of the pipeline.
    #[serde(default = "default_target_language", alias = "targetLanguage")]
    pub target_language: String,

    /// Retrieval category used when the caller names none.
    #[serde(default = "default_rag_category", alias = "ragCategory")]
    pub rag_category: Option<String>,

    /// Generation defaults.
    #[serde(default)]
    pub generation: GenerationParams,
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.into()
}
fn default_rag_category() -> Option<String> {
    Some("general".into())
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            rag_category: default_rag_category(),
            generation: GenerationParams::default(),
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// HTTP API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty means permissive.
    #[serde(default, alias = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}
