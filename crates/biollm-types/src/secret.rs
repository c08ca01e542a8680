//! Credential wrapper for capability endpoints.
//!
//! The key for the hosted capabilities is supplied out of band (config file
//! or an environment variable read once at startup) and then handed to the
//! endpoint client constructor. [`ApiKey`] keeps it out of logs and out of
//! any serialized config dump.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An API key for the hosted capabilities.
///
/// `Debug` and `Display` print `[REDACTED]`, serialization emits an empty
/// string, and [`expose`](ApiKey::expose) is the only way to read the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the key from an environment variable, trimming whitespace.
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// Keep this key if it is set, otherwise fall back to `var`.
    pub fn or_env(self, var: &str) -> Self {
        if self.is_empty() {
            Self::from_env(var).unwrap_or_default()
        } else {
            self
        }
    }

    /// The raw key, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` when no key is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "ApiKey(unset)")
        } else {
            write!(f, "ApiKey([REDACTED])")
        }
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "[REDACTED]")
        }
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_redact() {
        let key = ApiKey::new("team-key-123");
        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
        assert_eq!(key.to_string(), "[REDACTED]");
        assert_eq!(format!("{:?}", ApiKey::default()), "ApiKey(unset)");
    }

    #[test]
    fn serialize_never_emits_value() {
        let json = serde_json::to_string(&ApiKey::new("team-key-123")).unwrap();
        assert_eq!(json, "\"\"");
    }

    #[test]
    fn deserialize_plain_string() {
        let key: ApiKey = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(key.expose(), "abc");
    }

    #[test]
    fn or_env_prefers_explicit_value() {
        temp_env::with_var("BIOLLM_TEST_KEY_EXPLICIT", Some("from-env"), || {
            let key = ApiKey::new("explicit").or_env("BIOLLM_TEST_KEY_EXPLICIT");
            assert_eq!(key.expose(), "explicit");
        });
    }

    #[test]
    fn or_env_falls_back_to_env() {
        temp_env::with_var("BIOLLM_TEST_KEY_FALLBACK", Some("  from-env \n"), || {
            let key = ApiKey::default().or_env("BIOLLM_TEST_KEY_FALLBACK");
            assert_eq!(key.expose(), "from-env");
        });
    }

    #[test]
    fn from_env_ignores_blank() {
        temp_env::with_var("BIOLLM_TEST_KEY_BLANK", Some("   "), || {
            assert!(ApiKey::from_env("BIOLLM_TEST_KEY_BLANK").is_none());
        });
        temp_env::with_var_unset("BIOLLM_TEST_KEY_UNSET", || {
            assert!(ApiKey::default().or_env("BIOLLM_TEST_KEY_UNSET").is_empty());
        });
    }
}
