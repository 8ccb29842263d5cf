//! Configuration System
//!
//! Loads configuration for the relay and the terminal client from a TOML
//! file, with `RAILCHAT_*` environment variables taking precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use railchat_core::wire::DEFAULT_CHAT_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion relay server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    [
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://localhost:3000",
        "http://localhost:8000",
        "http://localhost:8080",
    ]
    .iter()
    .map(|origin| origin.to_string())
    .collect()
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024 // 64 MiB, base64 inflates 20 MiB files by a third
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl RelayConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Azure OpenAI call parameters used by the relay
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Pin every request to this deployment instead of the requested model
    #[serde(default)]
    pub deployment: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_version() -> String {
    "2025-03-01-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            deployment: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Terminal client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_chat_url")]
    pub chat_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("railchat").to_string_lossy().to_string())
        .unwrap_or_else(|| "./railchat_data".to_string())
}

fn default_chat_url() -> String {
    DEFAULT_CHAT_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chat_url: default_chat_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, or from default locations, or environment only
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("railchat").join("config.toml")),
            Some(PathBuf::from("/etc/railchat/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `RAILCHAT_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Relay
        if let Some(host) = lookup("RAILCHAT_HOST") {
            self.relay.host = host;
        }
        if let Some(port) = lookup("RAILCHAT_PORT") {
            match port.parse() {
                Ok(p) => self.relay.port = p,
                Err(_) => tracing::warn!("Ignoring invalid RAILCHAT_PORT {:?}", port),
            }
        }

        // Completion
        if let Some(version) = lookup("RAILCHAT_API_VERSION") {
            self.completion.api_version = version;
        }
        if let Some(deployment) = lookup("RAILCHAT_DEPLOYMENT") {
            self.completion.deployment = Some(deployment).filter(|d| !d.trim().is_empty());
        }

        // Client
        if let Some(data_dir) = lookup("RAILCHAT_DATA_DIR") {
            self.client.data_dir = data_dir;
        }
        if let Some(url) = lookup("RAILCHAT_CHAT_URL") {
            self.client.chat_url = url;
        }

        // Logging
        if let Some(level) = lookup("RAILCHAT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("RAILCHAT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# railchat configuration
#
# Environment variables override these settings:
# - RAILCHAT_HOST
# - RAILCHAT_PORT
# - RAILCHAT_API_VERSION
# - RAILCHAT_DEPLOYMENT
# - RAILCHAT_DATA_DIR
# - RAILCHAT_CHAT_URL
# - RAILCHAT_LOG_LEVEL
# - RAILCHAT_LOG_FORMAT

[relay]
# Address the completion relay listens on
host = "127.0.0.1"
port = 8000

# Browser origins allowed to call the relay
cors_origins = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://localhost:8000",
    "http://localhost:8080",
]

# Largest accepted request body (bytes)
max_body_bytes = 67108864

[completion]
# Azure OpenAI REST API version
api_version = "2025-03-01-preview"

# Send every request to this deployment instead of the model chosen by the client
# deployment = "gpt-4-32k"

temperature = 0.7
max_tokens = 1000

# Upstream request timeout in seconds
request_timeout_secs = 120

[client]
# Where the terminal client keeps projects and settings
data_dir = "~/.local/share/railchat"

# Relay endpoint used by the terminal client
chat_url = "http://localhost:8000/api/chat"

request_timeout_secs = 120

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.relay.addr(), "127.0.0.1:8000");
        assert_eq!(config.relay.cors_origins.len(), 5);
        assert_eq!(config.completion.api_version, "2025-03-01-preview");
        assert_eq!(config.completion.max_tokens, 1000);
        assert!(config.completion.deployment.is_none());
        assert_eq!(config.client.chat_url, "http://localhost:8000/api/chat");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.relay.addr(), defaults.relay.addr());
        assert_eq!(config.relay.cors_origins, defaults.relay.cors_origins);
        assert_eq!(config.relay.max_body_bytes, defaults.relay.max_body_bytes);
        assert_eq!(config.completion.api_version, defaults.completion.api_version);
        assert_eq!(config.completion.temperature, defaults.completion.temperature);
        assert_eq!(config.client.chat_url, defaults.client.chat_url);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[relay]\nport = 9100\n\n[completion]\ndeployment = \"gpt-4-32k\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.relay.port, 9100);
        assert_eq!(config.relay.host, "127.0.0.1");
        assert_eq!(config.completion.deployment.as_deref(), Some("gpt-4-32k"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[relay\nport = ").unwrap();
        let broken = Config::load(&path).unwrap_err();
        assert!(matches!(broken, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RAILCHAT_PORT", "9000"),
            ("RAILCHAT_DEPLOYMENT", "gpt-4o"),
            ("RAILCHAT_CHAT_URL", "http://relay:8000/api/chat"),
            ("RAILCHAT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.relay.port, 9000);
        assert_eq!(config.completion.deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(config.client.chat_url, "http://relay:8000/api/chat");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "RAILCHAT_PORT").then(|| "eighty".to_string()));
        assert_eq!(config.relay.port, 8000);
    }
}
