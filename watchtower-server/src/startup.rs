// Wires configuration into the running service

use crate::assembler::ResponseAssembler;
use crate::config::{ConfigError, WatchtowerConfig};
use crate::http::ApiState;
use crate::open_meteo::{HttpGeocoder, OpenMeteoForecast};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use watchtower_llm::{DialogueComposer, LLMManager, Provider, TextGenerator};
use watchtower_spk::{SpeechError, SpeechSynthesizer};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Upstream client setup failed: {0}")]
    Upstream(#[from] watchtower_core::Error),

    #[error("Speech setup failed: {0}")]
    Speech(#[from] SpeechError),

    #[error("Failed to prepare static directory: {0}")]
    StaticDir(#[from] std::io::Error),
}

/// Build the shared request state from a validated configuration.
pub fn build_state(config: &WatchtowerConfig) -> Result<ApiState, StartupError> {
    config.validate()?;

    std::fs::create_dir_all(&config.server.static_dir)?;

    let weather = Arc::new(OpenMeteoForecast::new(&config.upstream)?);
    let naming = Arc::new(HttpGeocoder::new(&config.upstream)?);

    let manager = LLMManager::with_config(config.llm.clone());
    for provider in Provider::ALL {
        if manager.has_provider(provider) {
            info!("LLM provider {} configured", provider.as_str());
        }
    }
    if manager.default_provider().is_none() {
        warn!("No LLM API key configured; heroes will answer with fallback lines");
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(manager);
    let composer = DialogueComposer::from_config(generator, &config.llm);

    let speech = SpeechSynthesizer::new(config.speech.clone())?;

    let assembler = ResponseAssembler::new(weather, naming, composer, speech)
        .with_chat_max_tokens(config.llm.chat_max_tokens);

    Ok(ApiState::new(Arc::new(assembler), config.server.static_dir.clone()))
}
