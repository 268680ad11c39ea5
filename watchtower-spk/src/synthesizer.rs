//! Persona-aware speech synthesis

use crate::config::{SpeechConfig, VoiceConfig};
use crate::engines::api::ApiTtsEngine;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use crate::store::{ArtifactStore, FileArtifactStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use watchtower_core::Character;

/// Turns dialogue into a stored audio artifact in the speaker's voice.
pub struct SpeechSynthesizer {
    config: Arc<SpeechConfig>,
    engine: Option<Arc<dyn TtsEngine>>,
    store: Arc<dyn ArtifactStore>,
    timeout: Duration,
    queue_semaphore: Arc<Semaphore>,
}

impl SpeechSynthesizer {
    /// Build the OpenAI-backed synthesizer writing to `config.static_dir`.
    ///
    /// An engine without credentials leaves synthesis disabled rather than
    /// failing construction.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let store: Arc<dyn ArtifactStore> =
            Arc::new(FileArtifactStore::new(&config.static_dir, &config.url_prefix));

        let engine: Option<Arc<dyn TtsEngine>> = if config.enabled {
            let engine = ApiTtsEngine::from_config(&config.api_config)?;
            if engine.is_available() {
                info!("Speech synthesis enabled using {}", engine.name());
                Some(Arc::new(engine))
            } else {
                warn!("OpenAI TTS not available (API key missing); audio responses disabled");
                None
            }
        } else {
            info!("Speech synthesis disabled by configuration");
            None
        };

        Ok(Self::assemble(config, engine, store))
    }

    /// Synthesizer with an explicit engine and store.
    pub fn with_engine(
        config: SpeechConfig,
        engine: Arc<dyn TtsEngine>,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;
        let engine = if config.enabled { Some(engine) } else { None };
        Ok(Self::assemble(config, engine, store))
    }

    /// Synthesizer that never produces audio.
    pub fn disabled(store: Arc<dyn ArtifactStore>) -> Self {
        let config = SpeechConfig {
            enabled: false,
            ..SpeechConfig::default()
        };
        Self::assemble(config, None, store)
    }

    fn assemble(
        config: SpeechConfig,
        engine: Option<Arc<dyn TtsEngine>>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let queue_semaphore = Arc::new(Semaphore::new(config.queue_size.max(1)));
        Self {
            timeout: config.timeout(),
            config: Arc::new(config),
            engine,
            store,
            queue_semaphore,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Voice settings for the speaking character.
    pub fn voice_for(&self, character: Character) -> VoiceConfig {
        VoiceConfig::from_profile(character.voice(), &self.config.voice.language)
    }

    /// Text as sent to the engine, with the character's shaping applied.
    pub fn speech_text(text: &str, character: Character) -> String {
        match character.shaping() {
            Some(shaping) => shaping.apply(text),
            None => text.to_string(),
        }
    }

    /// Synthesize and store, surfacing every failure.
    pub async fn render(&self, text: &str, character: Character) -> Result<String, SpeechError> {
        let engine = self.engine.as_ref().ok_or(SpeechError::Disabled)?;

        if text.trim().is_empty() {
            return Err(SpeechError::Synthesizer("Nothing to synthesize".to_string()));
        }

        let speech = Self::speech_text(text, character);
        let voice = self.voice_for(character);

        // Waiting for a queue slot counts against the timeout.
        let audio = tokio::time::timeout(self.timeout, async {
            let _permit = self.queue_semaphore.acquire().await.map_err(|e| {
                SpeechError::Synthesizer(format!("Failed to acquire queue permit: {}", e))
            })?;

            debug!(
                "Synthesizing {} chars for {} with voice {:?} at {}x",
                speech.len(),
                character.name(),
                voice.name,
                voice.speed
            );
            engine.synthesize(&speech, &voice).await
        })
        .await
        .map_err(|_| SpeechError::Timeout(self.timeout))??;

        if audio.is_empty() {
            return Err(SpeechError::Engine("Engine returned no audio".to_string()));
        }
        if audio.len() > self.config.max_audio_bytes {
            return Err(SpeechError::Engine(format!(
                "Audio too large ({} bytes, max {} bytes)",
                audio.len(),
                self.config.max_audio_bytes
            )));
        }

        self.store.store(audio).await
    }

    /// Synthesize and store; any failure is logged and yields no audio.
    pub async fn synthesize(&self, text: &str, character: Character) -> Option<String> {
        match self.render(text, character).await {
            Ok(url) => Some(url),
            Err(SpeechError::Disabled) => {
                debug!("Speech synthesis disabled; skipping audio");
                None
            }
            Err(e) => {
                warn!("Speech synthesis failed for {}: {}", character.name(), e);
                None
            }
        }
    }
}
