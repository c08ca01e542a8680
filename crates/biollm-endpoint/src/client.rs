//! The [`EndpointClient`] trait.

use async_trait::async_trait;

use crate::capability::Capability;
use crate::error::Result;

/// Sends a structured request to a hosted capability.
///
/// Implementations must be safe to share across concurrent pipeline runs;
/// the pipeline holds one behind an `Arc` and never mutates it. The main
/// implementation is [`HttpEndpointClient`](crate::http::HttpEndpointClient).
///
/// # Example
///
/// ```rust,ignore
/// use biollm_endpoint::{Capability, EndpointClient};
///
/// async fn transcribe(client: &dyn EndpointClient, audio: &str) -> biollm_endpoint::Result<String> {
///     let reply = client
///         .invoke(Capability::Speech, &serde_json::json!({ "source_audio": audio }))
///         .await?;
///     Ok(reply.to_string())
/// }
/// ```
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// Short name for logs (e.g. "http", "scripted").
    fn name(&self) -> &str;

    /// Invoke `capability` with `body` and return its raw response.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`](crate::error::EndpointError) on transport
    /// failure, non-success status, unusable body, or timeout.
    async fn invoke(
        &self,
        capability: Capability,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value>;
}
