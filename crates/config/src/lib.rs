//! Configuration loading, validation, and management for realtychat.
//!
//! Loads configuration from `~/.realtychat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use realtychat_core::topic::{DEFAULT_KEYWORDS, MatchMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Provider names that resolve to a known base URL without `api_url`.
pub const BUILTIN_PROVIDERS: &[&str] = &[
    "openrouter",
    "openai",
    "ollama",
    "groq",
    "together",
    "vllm",
    "llamacpp",
    "llama.cpp",
];

/// The root configuration structure.
///
/// Maps directly to `~/.realtychat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Gateway (HTTP + WebSocket) configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation relay behavior
    #[serde(default)]
    pub relay: RelayConfig,

    /// Topic filter vocabulary and matching policy
    #[serde(default)]
    pub topic: TopicConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "gemma3".into()
}
fn default_temperature() -> f32 {
    0.7
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("gateway", &self.gateway)
            .field("relay", &self.relay)
            .field("topic", &self.topic)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// How the relay builds context and what it tells the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Number of most recent turns replayed into each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Upper bound on a single Model Service call
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,

    /// Store off-topic rejections as turns (they then reach future prompts)
    #[serde(default)]
    pub record_rejections: bool,

    #[serde(default = "default_connected_message")]
    pub connected_message: String,

    #[serde(default = "default_rejection_message")]
    pub rejection_message: String,

    #[serde(default = "default_failure_message")]
    pub failure_message: String,

    #[serde(default = "default_session_ended_message")]
    pub session_ended_message: String,
}

fn default_history_window() -> usize {
    4
}
fn default_model_timeout_secs() -> u64 {
    60
}
fn default_connected_message() -> String {
    "Connected to Real Estate AI".into()
}
fn default_rejection_message() -> String {
    "Sorry, I can only help with real estate and property investment.".into()
}
fn default_failure_message() -> String {
    "Sorry, I couldn't reach the real estate assistant right now. Please try again.".into()
}
fn default_session_ended_message() -> String {
    "Session ended.".into()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            model_timeout_secs: default_model_timeout_secs(),
            record_rejections: false,
            connected_message: default_connected_message(),
            rejection_message: default_rejection_message(),
            failure_message: default_failure_message(),
            session_ended_message: default_session_ended_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub match_mode: MatchMode,
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            match_mode: MatchMode::default(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.realtychat/config.toml).
    ///
    /// Environment variables checked afterwards:
    /// - `REALTYCHAT_API_KEY`, `OPENAI_API_KEY`, `OPENROUTER_API_KEY` (first hit wins)
    /// - `REALTYCHAT_PROVIDER`
    /// - `REALTYCHAT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::read_file(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("REALTYCHAT_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("REALTYCHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("REALTYCHAT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".realtychat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.relay.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "relay.history_window must be at least 1".into(),
            ));
        }

        if self.relay.model_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "relay.model_timeout_secs must be at least 1".into(),
            ));
        }

        if self.topic.keywords.is_empty() {
            return Err(ConfigError::ValidationError(
                "topic.keywords must not be empty".into(),
            ));
        }

        // An empty keyword would match every query in substring mode.
        if self.topic.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "topic.keywords must not contain blank entries".into(),
            ));
        }

        for (name, provider) in &self.providers {
            if provider.api_url.is_none() && !BUILTIN_PROVIDERS.contains(&name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name} needs an api_url"
                )));
            }
        }

        if !BUILTIN_PROVIDERS.contains(&self.default_provider.as_str())
            && !self.providers.contains_key(&self.default_provider)
        {
            return Err(ConfigError::ValidationError(format!(
                "default_provider '{}' is not built in; add [providers.{}] with an api_url",
                self.default_provider, self.default_provider
            )));
        }

        Ok(())
    }

    /// The model to request: the default provider's own `default_model`
    /// when set, otherwise the top-level `default_model`.
    pub fn effective_model(&self) -> &str {
        self.providers
            .get(&self.default_provider)
            .and_then(|p| p.default_model.as_deref())
            .unwrap_or(&self.default_model)
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Render this configuration as TOML with all api keys removed.
    pub fn to_redacted_toml(&self) -> String {
        let mut config = self.clone();
        config.api_key = None;
        for provider in config.providers.values_mut() {
            provider.api_key = None;
        }
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_redacted_toml()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            gateway: GatewayConfig::default(),
            relay: RelayConfig::default(),
            topic: TopicConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "ollama");
        assert_eq!(config.default_model, "gemma3");
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.relay.history_window, 4);
        assert!(!config.relay.record_rejections);
        assert_eq!(config.topic.match_mode, MatchMode::Substring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.topic.keywords, config.topic.keywords);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_and_timeout_rejected() {
        let mut config = AppConfig::default();
        config.relay.history_window = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.relay.model_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_keyword_rejected() {
        let mut config = AppConfig::default();
        config.topic.keywords.push("  ".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("blank"));

        config.topic.keywords.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.default_provider, "ollama");
    }

    #[test]
    fn load_from_file_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "openai"
default_model = "gpt-4o-mini"

[relay]
history_window = 6
record_rejections = true

[topic]
keywords = ["condo", "mortgage"]
match_mode = "whole_word"

[providers.openai]
api_key = "sk-test"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.relay.history_window, 6);
        assert!(config.relay.record_rejections);
        assert_eq!(config.relay.model_timeout_secs, 60);
        assert_eq!(config.topic.match_mode, MatchMode::WholeWord);
        assert_eq!(config.topic.keywords, vec!["condo", "mortgage"]);
        assert_eq!(
            config.providers["openai"].api_key.as_deref(),
            Some("sk-test")
        );
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_temperature = \"hot\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "OPENROUTER_API_KEY" => Some("sk-or".into()),
            "REALTYCHAT_MODEL" => Some("llama3".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.default_model, "llama3");
        assert_eq!(config.default_provider, "ollama");
    }

    #[test]
    fn env_does_not_replace_configured_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|_| Some("from-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.default_provider, "from-env");
    }

    #[test]
    fn debug_and_toml_output_hide_secrets() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk-provider".into()),
                ..ProviderConfig::default()
            },
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("sk-provider"));

        let rendered = config.to_redacted_toml();
        assert!(!rendered.contains("sk-"));
        assert!(rendered.contains("gemma3"));
    }

    #[test]
    fn provider_model_overrides_top_level_model() {
        let mut config = AppConfig {
            default_provider: "openai".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.effective_model(), "gemma3");

        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                default_model: Some("gpt-4o-mini".into()),
                ..ProviderConfig::default()
            },
        );
        assert_eq!(config.effective_model(), "gpt-4o-mini");

        // Only the default provider's model counts.
        config.default_provider = "ollama".into();
        assert_eq!(config.effective_model(), "gemma3");
    }

    #[test]
    fn unknown_provider_requires_api_url() {
        let mut config = AppConfig {
            default_provider: "acme".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("acme"));

        config.providers.insert("acme".into(), ProviderConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("providers.acme needs an api_url"));

        config.providers.get_mut("acme").unwrap().api_url =
            Some("http://127.0.0.1:9000/v1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_override_is_validated_once_after_applying() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_provider = \"acme\"\n").unwrap();

        // The file alone names an unknown provider.
        assert!(AppConfig::load_from(&path).is_err());

        // An env override can repair it before validation runs.
        let mut config = AppConfig::read_file(&path).unwrap();
        config.apply_env(|key| (key == "REALTYCHAT_PROVIDER").then(|| "openrouter".into()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("ollama"));
        assert!(toml_str.contains("history_window = 4"));
    }
}
