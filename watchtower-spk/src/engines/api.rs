//! OpenAI speech API engine

use crate::config::{ApiTtsConfig, RetryConfig, VoiceConfig};
use crate::engines::{validate_text, TtsEngine};
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_MODEL: &str = "tts-1";
const DEFAULT_VOICE: &str = "onyx";
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;
const MAX_ERROR_BODY_CHARS: usize = 500;

pub const OPENAI_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Speaking-rate bounds accepted by the speech endpoint
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

pub struct ApiTtsEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    retry_config: RetryConfig,
}

impl ApiTtsEngine {
    /// Create a new OpenAI TTS engine. Falls back to `OPENAI_API_KEY` when
    /// no key is supplied.
    pub fn new_openai(
        endpoint: String,
        api_key: Option<String>,
        model: Option<String>,
        timeout_secs: u64,
        retry_config: RetryConfig,
    ) -> Result<Self, SpeechError> {
        let parsed = Url::parse(&endpoint)
            .map_err(|e| SpeechError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        if parsed.scheme() != "https" {
            return Err(SpeechError::Config("API endpoint must use HTTPS".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SpeechError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            retry_config,
        })
    }

    pub fn from_config(config: &ApiTtsConfig) -> Result<Self, SpeechError> {
        Self::new_openai(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.timeout_secs,
            config.retry_config.clone(),
        )
    }

    /// Clamp a speaking-rate multiplier into the accepted range.
    pub fn clamp_speed(speed: f32) -> f32 {
        if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        }
    }

    fn request_body(&self, text: &str, voice_config: &VoiceConfig) -> serde_json::Value {
        let voice = voice_config
            .name
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VOICE);

        json!({
            "model": self.model,
            "input": text,
            "voice": voice,
            "response_format": "mp3",
            "speed": Self::clamp_speed(voice_config.speed),
        })
    }

    async fn synthesize_openai(&self, text: &str, voice_config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SpeechError::Engine("OpenAI API key not provided".to_string()))?;

        let url = format!("{}/v1/audio/speech", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(text, voice_config))
            .send()
            .await
            .map_err(|e| SpeechError::Api(format!("OpenAI API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text: String = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string())
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(SpeechError::Api(format!("OpenAI API error ({}): {}", status, error_text)));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_RESPONSE_SIZE as u64 {
                return Err(SpeechError::Api(format!(
                    "Response too large ({} bytes, max {} bytes)",
                    content_length, MAX_RESPONSE_SIZE
                )));
            }
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Api(format!("Failed to read audio response: {}", e)))?;

        if audio_bytes.len() > MAX_RESPONSE_SIZE {
            return Err(SpeechError::Api(format!(
                "Response too large ({} bytes, max {} bytes)",
                audio_bytes.len(),
                MAX_RESPONSE_SIZE
            )));
        }

        Ok(audio_bytes)
    }

    /// Retry wrapper for API calls
    async fn retry_request<F, Fut>(&self, f: F) -> Result<Bytes, SpeechError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<Bytes, SpeechError>>,
    {
        let mut delay = self.retry_config.initial_delay_ms;
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            match f().await {
                Ok(result) => return Ok(result),
                // Missing credentials will not fix themselves
                Err(e @ SpeechError::Engine(_)) => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.retry_config.max_retries {
                        debug!(
                            "TTS API request failed, retrying in {}ms (attempt {}/{})",
                            delay,
                            attempt + 1,
                            self.retry_config.max_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay = delay
                            .checked_mul(2)
                            .map(|d| d.min(self.retry_config.max_delay_ms))
                            .unwrap_or(self.retry_config.max_delay_ms);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SpeechError::Engine("Unknown error".to_string())))
    }
}

#[async_trait]
impl TtsEngine for ApiTtsEngine {
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        validate_text(text)?;
        self.retry_request(|| self.synthesize_openai(text, config)).await
    }

    async fn list_voices(&self) -> Result<Vec<String>, SpeechError> {
        Ok(OPENAI_VOICES.iter().map(|v| v.to_string()).collect())
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        "OpenAI TTS"
    }
}
