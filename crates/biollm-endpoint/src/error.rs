//! Endpoint error types.
//!
//! Every capability call returns [`Result<T>`], which uses [`EndpointError`]
//! as the error type. Stage adapters convert these into degraded stage
//! results; they never reach the pipeline's caller as faults.

use thiserror::Error;

use crate::capability::Capability;

/// Coarse classification of an endpoint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointErrorKind {
    /// The request never produced a response (DNS, connect, reset).
    Network,
    /// The capability answered with a failure status or an unusable body.
    Upstream,
    /// The call exceeded the configured timeout.
    Timeout,
}

/// Errors returned by an [`EndpointClient`](crate::client::EndpointClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EndpointError {
    /// Transport-level failure.
    #[error("network error calling {capability}: {message}")]
    Network {
        /// The capability that was being called.
        capability: Capability,
        /// Transport diagnostic.
        message: String,
    },

    /// The capability responded, but not usefully.
    #[error(
        "upstream error from {capability}{}: {message}",
        .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    Upstream {
        /// The capability that was called.
        capability: Capability,
        /// HTTP status, when the failure was a non-success status.
        status: Option<u16>,
        /// Response body or decode diagnostic.
        message: String,
    },

    /// The call did not complete within the timeout.
    #[error("{capability} timed out after {after_secs}s")]
    Timeout {
        /// The capability that was called.
        capability: Capability,
        /// The timeout that elapsed.
        after_secs: u64,
    },
}

impl EndpointError {
    /// The failure classification.
    pub fn kind(&self) -> EndpointErrorKind {
        match self {
            Self::Network { .. } => EndpointErrorKind::Network,
            Self::Upstream { .. } => EndpointErrorKind::Upstream,
            Self::Timeout { .. } => EndpointErrorKind::Timeout,
        }
    }

    /// The capability whose call failed.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Network { capability, .. }
            | Self::Upstream { capability, .. }
            | Self::Timeout { capability, .. } => *capability,
        }
    }

    pub(crate) fn upstream(capability: Capability, message: impl Into<String>) -> Self {
        Self::Upstream {
            capability,
            status: None,
            message: message.into(),
        }
    }
}

/// A convenience type alias for endpoint operations.
pub type Result<T> = std::result::Result<T, EndpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network() {
        let err = EndpointError::Network {
            capability: Capability::Speech,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "network error calling speech: connection refused"
        );
        assert_eq!(err.kind(), EndpointErrorKind::Network);
    }

    #[test]
    fn display_upstream_with_status() {
        let err = EndpointError::Upstream {
            capability: Capability::Generate,
            status: Some(503),
            message: "overloaded".into(),
        };
        assert_eq!(
            err.to_string(),
            "upstream error from generate (HTTP 503): overloaded"
        );
    }

    #[test]
    fn display_upstream_without_status() {
        let err = EndpointError::upstream(Capability::Search, "empty response body");
        assert_eq!(
            err.to_string(),
            "upstream error from search: empty response body"
        );
        assert_eq!(err.capability(), Capability::Search);
    }

    #[test]
    fn display_timeout() {
        let err = EndpointError::Timeout {
            capability: Capability::Search,
            after_secs: 30,
        };
        assert_eq!(err.to_string(), "search timed out after 30s");
        assert_eq!(err.kind(), EndpointErrorKind::Timeout);
    }
}
