//! Custom TTS engine implementation
//! Wraps caller-supplied closures; used for local backends and test doubles

use crate::config::VoiceConfig;
use crate::engines::{validate_text, TtsEngine};
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

type SynthesizeFn = dyn Fn(&str, &VoiceConfig) -> Result<Bytes, SpeechError> + Send + Sync;

/// Custom TTS engine wrapper
pub struct CustomTtsEngine {
    name: String,
    synthesize_fn: Arc<SynthesizeFn>,
    list_voices_fn: Arc<dyn Fn() -> Result<Vec<String>, SpeechError> + Send + Sync>,
    is_available_fn: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl CustomTtsEngine {
    /// Create a new custom TTS engine
    pub fn new<F1, F2, F3>(
        name: String,
        synthesize_fn: F1,
        list_voices_fn: F2,
        is_available_fn: F3,
    ) -> Self
    where
        F1: Fn(&str, &VoiceConfig) -> Result<Bytes, SpeechError> + Send + Sync + 'static,
        F2: Fn() -> Result<Vec<String>, SpeechError> + Send + Sync + 'static,
        F3: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            synthesize_fn: Arc::new(synthesize_fn),
            list_voices_fn: Arc::new(list_voices_fn),
            is_available_fn: Arc::new(is_available_fn),
        }
    }

    /// Always-available engine with no voice listing.
    pub fn from_fn<F>(name: impl Into<String>, synthesize_fn: F) -> Self
    where
        F: Fn(&str, &VoiceConfig) -> Result<Bytes, SpeechError> + Send + Sync + 'static,
    {
        Self::new(name.into(), synthesize_fn, || Ok(Vec::new()), || true)
    }
}

#[async_trait]
impl TtsEngine for CustomTtsEngine {
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        validate_text(text)?;
        (self.synthesize_fn)(text, config)
    }

    async fn list_voices(&self) -> Result<Vec<String>, SpeechError> {
        (self.list_voices_fn)()
    }

    fn is_available(&self) -> bool {
        (self.is_available_fn)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
