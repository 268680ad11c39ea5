//! TTS engine implementations

pub mod api;
pub mod custom;

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesize text to speech audio
    async fn synthesize(&self, text: &str, config: &crate::config::VoiceConfig) -> Result<Bytes, SpeechError>;

    /// Get available voices
    async fn list_voices(&self) -> Result<Vec<String>, SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}

/// Longest text accepted by the engines, in bytes
pub const MAX_TEXT_BYTES: usize = 100_000;

pub(crate) fn validate_text(text: &str) -> Result<(), SpeechError> {
    if text.trim().is_empty() {
        return Err(SpeechError::Engine("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_TEXT_BYTES {
        return Err(SpeechError::Engine("Text too long (max 100KB)".to_string()));
    }
    Ok(())
}
