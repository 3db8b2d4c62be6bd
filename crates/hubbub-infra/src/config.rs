//! Configuration loading.
//!
//! Settings come from `{data_dir}/config.toml` and fall back to defaults
//! when the file is missing or malformed. Credentials come from the
//! environment only and are wrapped in [`SecretString`] immediately; a
//! missing primary-provider key is fatal at startup.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::warn;

use hubbub_types::config::HubbubConfig;
use hubbub_types::error::ConfigError;

/// Environment variable for the Gemini (primary provider) API key.
pub const GEMINI_KEY_VAR: &str = "HUBBUB_GEMINI_API_KEY";

/// Environment variable for the Groq (backup provider) API key.
pub const GROQ_KEY_VAR: &str = "HUBBUB_GROQ_API_KEY";

/// Environment variable overriding the event-service base URL.
pub const EVENTS_URL_VAR: &str = "HUBBUB_EVENTS_URL";

/// Environment variable overriding the data directory.
pub const DATA_DIR_VAR: &str = "HUBBUB_DATA_DIR";

/// Resolve the data directory: `$HUBBUB_DATA_DIR`, else `~/.hubbub`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_VAR) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hubbub")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparseable file: warn and use defaults.
pub async fn load_config(data_dir: &Path) -> HubbubConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml at {}, using defaults", config_path.display());
            return HubbubConfig::default();
        }
        Err(err) => {
            warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return HubbubConfig::default();
        }
    };

    match toml::from_str::<HubbubConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            HubbubConfig::default()
        }
    }
}

/// API credentials loaded from the environment.
pub struct Credentials {
    pub gemini_api_key: SecretString,
    /// Absent when the backup key is not set; failover runs without a
    /// backup in that case.
    pub groq_api_key: Option<SecretString>,
}

/// Load credentials from the environment.
///
/// The primary key is required: without it the process must not serve
/// requests. The backup key is optional and its absence is only logged.
pub fn load_credentials() -> Result<Credentials, ConfigError> {
    let gemini_api_key = std::env::var(GEMINI_KEY_VAR)
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingCredential(GEMINI_KEY_VAR.to_string()))?;

    let groq_api_key = match std::env::var(GROQ_KEY_VAR) {
        Ok(key) => Some(SecretString::from(key)),
        Err(_) => {
            warn!("{GROQ_KEY_VAR} not set, backup provider unavailable");
            None
        }
    };

    Ok(Credentials {
        gemini_api_key,
        groq_api_key,
    })
}

/// The event-service base URL: environment override, else config value.
pub fn resolve_events_url(config: &HubbubConfig) -> String {
    std::env::var(EVENTS_URL_VAR).unwrap_or_else(|_| config.events.base_url.clone())
}
