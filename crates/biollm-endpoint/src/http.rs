//! HTTP implementation of [`EndpointClient`].
//!
//! [`HttpEndpointClient`] posts JSON to `{base_url}/{model_id}` for each
//! capability, authenticating with the configured key header. One
//! `reqwest::Client` (and its connection pool) is shared by all calls.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use biollm_types::config::EndpointsConfig;
use biollm_types::{ApiKey, BiollmError};

use crate::capability::Capability;
use crate::client::EndpointClient;
use crate::error::{EndpointError, Result};

/// Longest response body echoed back in an upstream error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Endpoint client that talks to the hosted capabilities over HTTP.
///
/// # Construction
///
/// ```rust,ignore
/// use biollm_endpoint::HttpEndpointClient;
///
/// let api_key = config.endpoints.resolved_api_key();
/// let client = HttpEndpointClient::new(config.endpoints.clone(), api_key)?;
/// ```
pub struct HttpEndpointClient {
    config: EndpointsConfig,
    api_key: ApiKey,
    http: reqwest::Client,
}

impl HttpEndpointClient {
    /// Create a client from endpoint configuration and an explicit key.
    ///
    /// The configured timeout is applied to every request. An empty key is
    /// allowed (for unauthenticated local endpoints) but logged.
    pub fn new(config: EndpointsConfig, api_key: ApiKey) -> biollm_types::Result<Self> {
        if config.timeout_secs == 0 {
            return Err(BiollmError::ConfigInvalid {
                reason: "endpoints.timeout_secs must be greater than zero".into(),
            });
        }
        if api_key.is_empty() {
            warn!(
                env = %config.api_key_env,
                "no API key configured; capability calls will be unauthenticated"
            );
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BiollmError::ConfigInvalid {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config,
            api_key,
            http,
        })
    }

    /// Returns the endpoint configuration.
    pub fn config(&self) -> &EndpointsConfig {
        &self.config
    }

    /// URL serving `capability`.
    fn capability_url(&self, capability: Capability) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/{}", capability.model_id(&self.config.models))
    }

    /// Map a transport error onto the endpoint taxonomy.
    fn classify(&self, capability: Capability, err: reqwest::Error) -> EndpointError {
        if err.is_timeout() {
            EndpointError::Timeout {
                capability,
                after_secs: self.config.timeout_secs,
            }
        } else {
            EndpointError::Network {
                capability,
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn invoke(&self, capability: Capability, body: &Value) -> Result<Value> {
        let url = self.capability_url(capability);

        debug!(capability = %capability, url = %url, "invoking capability");

        let mut req = self.http.post(&url).header(CONTENT_TYPE, "application/json");
        if !self.api_key.is_empty() {
            req = req.header(self.config.auth_header.as_str(), self.api_key.expose());
        }
        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(capability, e))?;

        let status = response.status();
        let declared_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));
        let text = response
            .text()
            .await
            .map_err(|e| self.classify(capability, e))?;

        if !status.is_success() {
            warn!(
                capability = %capability,
                status = status.as_u16(),
                "capability returned failure status"
            );
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                truncate(&text, MAX_ERROR_BODY_CHARS)
            };
            return Err(EndpointError::Upstream {
                capability,
                status: Some(status.as_u16()),
                message,
            });
        }

        let value = decode_body(capability, declared_json, &text)?;

        debug!(
            capability = %capability,
            status = status.as_u16(),
            bytes = text.len(),
            "capability response received"
        );

        Ok(value)
    }
}

/// Turn a successful response body into a JSON value.
///
/// A body declared as JSON must parse. Anything else is parsed
/// opportunistically and otherwise returned as a JSON string, which the
/// stage adapters coerce to text.
fn decode_body(capability: Capability, declared_json: bool, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(EndpointError::upstream(capability, "empty response body"));
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(e) if declared_json => Err(EndpointError::upstream(
            capability,
            format!("malformed response body: {e}"),
        )),
        Err(_) => Ok(Value::String(text.to_string())),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

impl std::fmt::Debug for HttpEndpointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpointClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .field("api_key", &self.api_key)
            .finish()
    }
}
