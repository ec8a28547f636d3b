//! Configuration loading for Parley.
//!
//! Reads `config.toml` and the chat-modes JSON file from the data directory
//! (`~/.parley/` in production) and resolves provider credentials from the
//! environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use parley_types::config::{AppConfig, ProviderConfig};
use parley_types::error::ConfigError;
use parley_types::llm::ProviderId;
use parley_types::mode::ModeDefinition;

/// Resolve the Parley data directory.
///
/// Checks `PARLEY_DATA_DIR` first, then falls back to `~/.parley`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    // Last resort: current directory
    PathBuf::from(".parley")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparsable file: [`ConfigError`].
pub async fn load_app_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: config_path.display().to_string(),
        message: err.to_string(),
    })?;

    config.validate().map_err(|message| ConfigError::Parse {
        path: config_path.display().to_string(),
        message,
    })?;

    Ok(config)
}

/// Load mode definitions from a JSON object file (`{"name": "instruction"}`).
///
/// A missing file yields no modes.
pub async fn load_modes(path: &Path) -> Result<Vec<ModeDefinition>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("No mode file at {}, no chat modes available", path.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let map: HashMap<String, String> =
        serde_json::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

    let mut modes: Vec<ModeDefinition> = map
        .into_iter()
        .map(|(name, instruction)| ModeDefinition { name, instruction })
        .collect();
    modes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(modes)
}

/// Path of the mode file: absolute as given, otherwise relative to `data_dir`.
pub fn modes_path(data_dir: &Path, config: &AppConfig) -> PathBuf {
    let path = Path::new(&config.modes_file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

/// Environment variable that overrides a provider's model.
fn model_env_var(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "OPENAI_MODEL",
        ProviderId::Anthropic => "ANTHROPIC_MODEL",
        ProviderId::ImageGen => "IMAGE_GEN_MODEL",
    }
}

/// Effective provider configuration: defaults, then `config.toml`, then
/// model environment overrides.
pub fn provider_config_with(
    config: &AppConfig,
    id: ProviderId,
    env: impl Fn(&str) -> Option<String>,
) -> ProviderConfig {
    let mut provider = config.provider_config(id);
    if let Some(model) = env(model_env_var(id)).filter(|m| !m.trim().is_empty()) {
        provider.model = model;
    }
    provider
}

pub fn provider_config(config: &AppConfig, id: ProviderId) -> ProviderConfig {
    provider_config_with(config, id, env_lookup)
}

/// Resolve a provider's API key through `env`.
///
/// Empty values count as missing.
pub fn resolve_api_key_with(
    config: &ProviderConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    env(&config.api_key_env)
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingCredential {
            env: config.api_key_env.clone(),
        })
}

pub fn resolve_api_key(config: &ProviderConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, env_lookup)
}

fn env_lookup(name: &str) -> Option<String> {
    // Non-Unicode values are treated as unset.
    std::env::var(name).ok()
}
