// Server configuration: TOML file, then environment, then CLI flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use watchtower_llm::LLMConfig;
use watchtower_spk::SpeechConfig;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_REVERSE_GEOCODING_URL: &str =
    "https://api.bigdatacloud.net/data/reverse-geocode-client";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchtowerConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub llm: LLMConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory audio artifacts are written to and served from
    pub static_dir: PathBuf,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("server.port cannot be 0".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        if self.static_dir.as_os_str().is_empty() {
            return Err("server.static_dir cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Third-party geocoding and forecast services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub forecast_url: String,
    pub timeout_secs: u64,
    pub forecast_days: u8,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            reverse_geocoding_url: DEFAULT_REVERSE_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            timeout_secs: 10,
            forecast_days: 7,
        }
    }
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("geocoding_url", &self.geocoding_url),
            ("reverse_geocoding_url", &self.reverse_geocoding_url),
            ("forecast_url", &self.forecast_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(format!("upstream.{} must be an http(s) URL, got '{}'", name, value));
            }
        }
        if self.timeout_secs == 0 {
            return Err("upstream.timeout_secs must be greater than 0".to_string());
        }
        if !(1..=16).contains(&self.forecast_days) {
            return Err(format!(
                "upstream.forecast_days must be within 1..=16, got {}",
                self.forecast_days
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl WatchtowerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.to_string_lossy();

        if display.contains("..") || display.contains("//") || display.contains("\\\\") {
            return Err(ConfigError::Io(format!("Path traversal detected: '{}'", display)));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", display, e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: WatchtowerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.sync_static_dir();
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("WATCHTOWER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("WATCHTOWER_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid WATCHTOWER_PORT '{}'", port),
            }
        }
        if let Some(dir) = get("WATCHTOWER_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Some(level) = get("WATCHTOWER_LOG_LEVEL") {
            self.server.log_level = level;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key.clone());
            self.speech.api_config.api_key = Some(key);
        }
        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.llm.anthropic_api_key = Some(key);
        }

        self.sync_static_dir();
    }

    /// The speech store writes where the server serves from.
    pub fn sync_static_dir(&mut self) {
        self.speech.static_dir = self.server.static_dir.clone();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(ConfigError::Validation)?;
        self.upstream.validate().map_err(ConfigError::Validation)?;
        self.llm.validate().map_err(ConfigError::Validation)?;
        self.speech.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = WatchtowerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.forecast_days, 7);
        assert_eq!(config.upstream.forecast_url, DEFAULT_FORECAST_URL);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WatchtowerConfig::from_toml(
            r#"
            [server]
            port = 9100
            static_dir = "audio"

            [llm]
            max_tokens = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.max_tokens, 120);
        assert_eq!(config.llm.chat_max_tokens, 500);
        assert_eq!(config.speech.static_dir, PathBuf::from("audio"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            WatchtowerConfig::from_toml("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = WatchtowerConfig::default();
        config.apply_env_from(env(&[
            ("WATCHTOWER_HOST", "127.0.0.1"),
            ("WATCHTOWER_PORT", "9000"),
            ("WATCHTOWER_STATIC_DIR", "/tmp/watchtower"),
            ("OPENAI_API_KEY", "sk-test"),
        ]));
        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.speech.static_dir, PathBuf::from("/tmp/watchtower"));
        assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.speech.api_config.api_key.as_deref(), Some("sk-test"));
        assert!(config.llm.anthropic_api_key.is_none());
    }

    #[test]
    fn test_bad_port_is_ignored() {
        let mut config = WatchtowerConfig::default();
        config.apply_env_from(env(&[("WATCHTOWER_PORT", "not-a-port"), ("ANTHROPIC_API_KEY", "  ")]));
        assert_eq!(config.server.port, 8000);
        assert!(config.llm.anthropic_api_key.is_none());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = WatchtowerConfig::default();
        config.upstream.forecast_url = "ftp://example".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = WatchtowerConfig::default();
        config.upstream.forecast_days = 0;
        assert!(config.validate().is_err());

        let mut config = WatchtowerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_rejects_traversal() {
        assert!(matches!(
            WatchtowerConfig::from_file("../etc/watchtower.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchtower.toml");
        std::fs::write(&path, "[upstream]\ntimeout_secs = 4\n").unwrap();
        let config = WatchtowerConfig::from_file(&path).unwrap();
        assert_eq!(config.upstream.timeout_secs, 4);
    }
}
