//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. An explicit path (the CLI `--config` flag).
//! 2. `REVGUARD_CONFIG` environment variable.
//! 3. `~/.revguard/config.json`
//! 4. If none found, the built-in defaults.
//!
//! JSON keys are normalized from camelCase to snake_case before the typed
//! [`RevguardConfig`] is deserialized, and the result is validated.

use std::path::{Path, PathBuf};

use serde_json::Value;

use revguard_types::{ConfigError, RevguardConfig};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "REVGUARD_CONFIG";

/// Pick the config file path from the fallback chain.
///
/// `env_path` is the value of [`CONFIG_ENV`], passed in so discovery stays
/// testable. Returns `None` when nothing applies.
pub fn discover_config_path(
    explicit: Option<&Path>,
    env_path: Option<String>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let candidate = home_dir?.join(".revguard").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load and validate the configuration.
///
/// A discovered path that does not exist falls back to defaults with a
/// warning; an explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<RevguardConfig, ConfigError> {
    let path = discover_config_path(
        explicit,
        std::env::var(CONFIG_ENV).ok(),
        dirs::home_dir(),
    );

    let config = match path {
        None => {
            tracing::info!("no config file found, using defaults");
            RevguardConfig::default()
        }
        Some(path) if explicit.is_none() && !path.exists() => {
            tracing::warn!(
                path = %path.display(),
                "config path does not exist, using defaults"
            );
            RevguardConfig::default()
        }
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            load_config_file(&path)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Read and deserialize one config file without validating it.
pub fn load_config_file(path: &Path) -> Result<RevguardConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&contents)
}

/// Parse config JSON, normalizing keys first.
pub fn parse_config(contents: &str) -> Result<RevguardConfig, ConfigError> {
    let value: Value = serde_json::from_str(contents)?;
    Ok(serde_json::from_value(normalize_keys(value))?)
}

/// Convert camelCase JSON keys to snake_case recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (camel_to_snake(&key), normalize_keys(val)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a single camelCase string to snake_case.
///
/// A run of capitals is kept together as one word (`"maxHTTPBytes"` becomes
/// `"max_http_bytes"`).
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
