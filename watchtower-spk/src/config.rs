//! Configuration for speech synthesis

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use watchtower_core::VoiceProfile;

const MAX_AUDIO_BYTES_LIMIT: usize = 50 * 1024 * 1024;

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Enable speech synthesis
    pub enabled: bool,

    /// Voice used when a caller does not supply one
    pub voice: VoiceConfig,

    /// Speech API settings
    pub api_config: ApiTtsConfig,

    /// Directory audio artifacts are written to
    pub static_dir: PathBuf,

    /// URL prefix the static directory is served under
    pub url_prefix: String,

    /// Largest audio payload accepted from the engine
    pub max_audio_bytes: usize,

    /// Concurrent synthesis requests allowed
    pub queue_size: usize,
}

/// Voice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Voice name/identifier
    pub name: Option<String>,

    /// Language code (e.g., "en-US", "es-ES")
    pub language: String,

    /// Speaking-rate multiplier, 1.0 is normal
    pub speed: f32,
}

/// API TTS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiTtsConfig {
    /// API endpoint URL
    pub endpoint: String,

    /// API key (optional, can be set via environment)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model ID
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retry configuration
    pub retry_config: RetryConfig,
}

/// Retry configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voice: VoiceConfig::default(),
            api_config: ApiTtsConfig::default(),
            static_dir: PathBuf::from("static"),
            url_prefix: "/static".to_string(),
            max_audio_bytes: 10 * 1024 * 1024,
            queue_size: 16,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: None,
            language: "en-US".to_string(),
            speed: 1.0,
        }
    }
}

impl Default for ApiTtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            api_key: None,
            model: Some("tts-1".to_string()),
            timeout_secs: 30,
            retry_config: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl VoiceConfig {
    /// Voice settings for a persona's voice profile.
    pub fn from_profile(profile: VoiceProfile, language: &str) -> Self {
        Self {
            name: Some(profile.voice.to_string()),
            language: language.to_string(),
            speed: profile.speed,
        }
    }

    /// Validate voice configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err("Voice name cannot be empty if provided".to_string());
            }

            if name.len() > 256 {
                return Err("Voice name too long (max 256 chars)".to_string());
            }

            if name.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("Voice name contains invalid characters".to_string());
            }
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err("Voice speed must be a positive number".to_string());
        }

        Ok(())
    }
}

impl RetryConfig {
    /// Validate retry configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("Max retries too large (max 10)".to_string());
        }

        if self.initial_delay_ms > 60_000 {
            return Err("Initial delay too large (max 60000 ms)".to_string());
        }

        if self.initial_delay_ms > self.max_delay_ms {
            return Err("Initial delay cannot be greater than max delay".to_string());
        }

        Ok(())
    }
}

impl ApiTtsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("API endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("https://") {
            return Err("API endpoint must use HTTPS".to_string());
        }

        if self.endpoint.len() > 2048 {
            return Err("API endpoint URL too long (max 2048 chars)".to_string());
        }

        if url::Url::parse(&self.endpoint).is_err() {
            return Err(format!("API endpoint is not a valid URL: {}", self.endpoint));
        }

        if let Some(ref model) = self.model {
            if model.is_empty() || model.len() > 256 {
                return Err("API model name must be 1-256 chars".to_string());
            }
            if model.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("API model name contains invalid characters".to_string());
            }
        }

        if self.timeout_secs == 0 {
            return Err("API timeout must be greater than 0".to_string());
        }

        if self.timeout_secs > 300 {
            return Err("API timeout too large (max 300 seconds)".to_string());
        }

        self.retry_config.validate()
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_size == 0 {
            return Err("Queue size must be greater than 0".to_string());
        }

        if self.queue_size > 10000 {
            return Err("Queue size too large (max 10000)".to_string());
        }

        if self.static_dir.as_os_str().is_empty() {
            return Err("Static directory cannot be empty".to_string());
        }

        if self.static_dir.to_string_lossy().contains("..") {
            return Err("Static directory path cannot contain '..'".to_string());
        }

        if !self.url_prefix.starts_with('/') {
            return Err("URL prefix must start with '/'".to_string());
        }

        if self.max_audio_bytes == 0 || self.max_audio_bytes > MAX_AUDIO_BYTES_LIMIT {
            return Err(format!(
                "max_audio_bytes must be between 1 and {}",
                MAX_AUDIO_BYTES_LIMIT
            ));
        }

        self.voice.validate()?;
        self.api_config.validate()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.api_config.timeout_secs)
    }
}
