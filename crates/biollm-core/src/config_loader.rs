//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. An explicit path (the CLI `--config` flag).
//! 2. `BIOLLM_CONFIG` environment variable.
//! 3. `~/.biollm/config.json`
//! 4. If none found, the built-in defaults.
//!
//! JSON keys are normalized from camelCase to snake_case before
//! deserializing. The `headers` map is left untouched since its keys are
//! HTTP header names.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use biollm_types::{BiollmError, Config, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BIOLLM_CONFIG";

/// Objects whose keys are data rather than field names.
const VERBATIM_KEYS: &[&str] = &["headers"];

/// Discover the config file path using the fallback chain.
///
/// Explicit and env-var paths are returned as given; the home-directory
/// candidate only when it exists.
pub fn discover_config_path(
    explicit: Option<&Path>,
    env_value: Option<String>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    let candidate = home_dir?.join(".biollm").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load and validate the configuration.
///
/// A missing file means defaults; an unreadable or malformed one is an
/// error.
pub async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = discover_config_path(
        explicit,
        std::env::var(CONFIG_ENV).ok(),
        dirs::home_dir(),
    );

    let config = match path {
        None => {
            info!("no config file found, using defaults");
            Config::default()
        }
        Some(path) if !path.exists() => {
            warn!(path = %path.display(), "config path does not exist, using defaults");
            Config::default()
        }
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            let contents = tokio::fs::read_to_string(&path).await?;
            parse_config(&contents).map_err(|e| BiollmError::ConfigInvalid {
                reason: format!("{}: {e}", path.display()),
            })?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Parse config JSON, normalizing keys first.
pub fn parse_config(contents: &str) -> Result<Config> {
    let value: Value = serde_json::from_str(contents)?;
    Ok(serde_json::from_value(normalize_keys(value))?)
}

/// Convert camelCase JSON keys to snake_case recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    let key = camel_to_snake(&key);
                    let val = if VERBATIM_KEYS.contains(&key.as_str()) {
                        val
                    } else {
                        normalize_keys(val)
                    };
                    (key, val)
                })
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a single camelCase string to snake_case.
///
/// A run of capitals is kept together as one word, so `"apiKeyEnv"`
/// becomes `"api_key_env"` and `"baseURL"` becomes `"base_url"`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            if prev.is_lowercase()
                || (prev.is_uppercase() && next.is_some_and(|c| c.is_lowercase()))
            {
                result.push('_');
            }
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}
