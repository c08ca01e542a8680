//! Endpoint client for the hosted capabilities biollm chains together.
//!
//! # Architecture
//!
//! - [`Capability`] names one hosted service (speech, translate, search, generate)
//! - [`EndpointClient`] is the request/response seam the pipeline talks to
//! - [`HttpEndpointClient`] implements it over HTTPS with `reqwest`
//! - [`EndpointError`] classifies failures as network, upstream or timeout
//!
//! The client performs no retries; each failure is surfaced once.
//!
//! ```rust,ignore
//! use biollm_endpoint::{Capability, EndpointClient, HttpEndpointClient};
//!
//! let client = HttpEndpointClient::new(config.endpoints.clone(), api_key)?;
//! let reply = client
//!     .invoke(Capability::Translate, &serde_json::json!({
//!         "text": "dolor de pecho",
//!         "sourcelanguage": "es",
//!         "targetlanguage": "en",
//!     }))
//!     .await?;
//! ```

pub mod capability;
pub mod client;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;

pub use capability::Capability;
pub use client::EndpointClient;
pub use error::{EndpointError, EndpointErrorKind, Result};
pub use http::HttpEndpointClient;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedEndpointClient;
