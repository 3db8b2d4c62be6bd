//! Configuration shapes loaded from `config.toml`.
//!
//! Every field has a serde default so a missing or partial file still
//! yields a usable configuration. Credentials are NOT part of this file;
//! they come from the environment (see `hubbub-infra::config`).

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubbubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub events: EventServiceConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Hard cap on stored messages per session; oldest evicted first.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// How many recent messages feed each prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            history_window: default_history_window(),
        }
    }
}

/// Remote event-search service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventServiceConfig {
    #[serde(default = "default_events_url")]
    pub base_url: String,
    /// Per-call timeout for search/get_all, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
    /// Timeout for the health probe, in seconds.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    /// How long a probe result stays fresh, in seconds.
    #[serde(default = "default_health_cache_secs")]
    pub health_cache_secs: u64,
}

impl Default for EventServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_events_url(),
            search_timeout_secs: default_search_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            health_cache_secs: default_health_cache_secs(),
        }
    }
}

/// LLM generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    #[serde(default = "default_backup_model")]
    pub backup_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary_model: default_primary_model(),
            backup_model: default_backup_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Local knowledge index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Chunks fetched per query.
    #[serde(default = "default_chunks_per_query")]
    pub chunks_per_query: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunks_per_query: default_chunks_per_query(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_messages() -> usize {
    20
}

fn default_history_window() -> usize {
    6
}

fn default_events_url() -> String {
    "http://127.0.0.1:8100".to_string()
}

fn default_search_timeout_secs() -> u64 {
    30
}

fn default_health_timeout_secs() -> u64 {
    5
}

fn default_health_cache_secs() -> u64 {
    5
}

fn default_primary_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_backup_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f64 {
    0.7
}

fn default_chunks_per_query() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: HubbubConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.memory.max_messages, 20);
        assert_eq!(config.memory.history_window, 6);
        assert_eq!(config.events.search_timeout_secs, 30);
        assert_eq!(config.events.health_timeout_secs, 5);
        assert_eq!(config.generation.max_tokens, 512);
        assert_eq!(config.knowledge.chunks_per_query, 3);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: HubbubConfig = toml::from_str(
            r#"
[server]
port = 9000

[memory]
max_messages = 50

[events]
base_url = "http://events.internal:8100"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.memory.max_messages, 50);
        assert_eq!(config.events.base_url, "http://events.internal:8100");
        assert_eq!(config.generation.primary_model, "gemini-2.5-flash");
    }
}
