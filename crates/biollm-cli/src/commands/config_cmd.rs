//! `biollm config` -- display resolved configuration.
//!
//! Shows the full resolved configuration as formatted JSON, or one section
//! by name. The API key is never printed.
//!
//! # Examples
//!
//! ```text
//! biollm config show
//! biollm config show endpoints
//! ```

use serde_json::Value;

use biollm_types::Config;

/// Render the configuration, or one top-level section of it.
pub fn render(config: &Config, section: Option<&str>) -> anyhow::Result<String> {
    let value = serde_json::to_value(config)?;
    let selected = match section {
        None => &value,
        Some(name) => match value.get(name) {
            Some(v) => v,
            None => {
                let available: Vec<&str> = value
                    .as_object()
                    .map(|m| m.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                anyhow::bail!(
                    "unknown section '{name}' (available: {})",
                    available.join(", ")
                );
            }
        },
    };
    Ok(serde_json::to_string_pretty::<Value>(selected)?)
}

/// Print the configuration to stdout.
pub fn config_show(config: &Config, section: Option<&str>) -> anyhow::Result<()> {
    println!("{}", render(config, section)?);
    Ok(())
}
