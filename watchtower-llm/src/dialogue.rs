//! In-character dialogue generation with canned fallbacks
//!
//! The composer never fails: generator errors, empty output and timeouts all
//! degrade to the speaking character's fallback line.

use crate::config::LLMConfig;
use crate::error::{LLMError, Result};
use crate::generator::TextGenerator;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use watchtower_core::{Character, ConversationTurn, WeatherSnapshot};

/// Used when the caller did not ask anything
pub const DEFAULT_USER_MESSAGE: &str = "Give me a weather report.";

const DEFAULT_LOCATION_NAME: &str = "your location";

/// Everything the prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct DialogueRequest<'a> {
    pub character: Character,
    pub snapshot: Option<&'a WeatherSnapshot>,
    pub location: Option<&'a str>,
    pub message: Option<&'a str>,
    pub turns: &'a [ConversationTurn],
    /// Overrides the composer's token limit
    pub max_tokens: Option<u32>,
}

impl<'a> DialogueRequest<'a> {
    pub fn new(character: impl Into<Character>) -> Self {
        Self {
            character: character.into(),
            snapshot: None,
            location: None,
            message: None,
            turns: &[],
            max_tokens: None,
        }
    }

    pub fn with_weather(mut self, snapshot: &'a WeatherSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_location(mut self, location: &'a str) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    pub fn with_turns(mut self, turns: &'a [ConversationTurn]) -> Self {
        self.turns = turns;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The user's message, or the default request when it is missing or blank.
    pub fn effective_message(&self) -> &'a str {
        match self.message.map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_USER_MESSAGE,
        }
    }
}

pub struct DialogueComposer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl DialogueComposer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::from_config(generator, &LLMConfig::default())
    }

    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &LLMConfig) -> Self {
        Self {
            generator,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Render the generation prompt.
    pub fn build_prompt(request: &DialogueRequest<'_>) -> String {
        let character = request.character;
        let mut prompt = String::new();

        let _ = writeln!(prompt, "{}", character.description());
        let _ = writeln!(prompt);

        let _ = writeln!(prompt, "Current Context:");
        let location = request
            .location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION_NAME);
        match request.snapshot {
            Some(snapshot) => {
                let _ = write!(prompt, "Current weather in {}: ", location);
                if let Some(temperature) = snapshot.temperature_c() {
                    let _ = write!(prompt, "Temperature: {:.1}°C, ", temperature);
                }
                let _ = write!(
                    prompt,
                    "Condition: {}",
                    if snapshot.condition().is_empty() { "unknown" } else { snapshot.condition() }
                );
                if let Some(humidity) = snapshot.humidity_pct() {
                    let _ = write!(prompt, ", Humidity: {:.0}%", humidity);
                }
                if let Some(wind) = snapshot.measured_wind_kmh().filter(|w| w.is_finite()) {
                    let _ = write!(prompt, ", Wind Speed: {:.1} km/h", wind);
                }
                let _ = writeln!(prompt, ", Time of day: {}", snapshot.daypart().as_str());
            }
            None => {
                let _ = writeln!(prompt, "Location: {}. No weather data available.", location);
            }
        }
        let _ = writeln!(prompt);

        let recent = ConversationTurn::recent(request.turns);
        if !recent.is_empty() {
            let _ = writeln!(prompt, "Recent Conversation:");
            for turn in recent {
                let _ = writeln!(prompt, "{}: {}", turn.role.as_str(), turn.text.trim());
            }
            let _ = writeln!(prompt);
        }

        let _ = writeln!(prompt, "User's Question: {}", request.effective_message());
        let _ = writeln!(prompt);
        let _ = write!(
            prompt,
            "IMPORTANT: Respond as {} with their unique personality. Be witty, sarcastic, and humorous when appropriate. \
             If the user is making fun of you, answer with clever comebacks that match your character and don't be easily offended. \
             Keep the response conversational and true to your character's voice.",
            character.name()
        );
        prompt
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let call = self.generator.generate(prompt, max_tokens, self.temperature);
        let text = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LLMError::Timeout(self.timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(LLMError::InvalidResponse("Generator returned empty text".to_string()));
        }
        Ok(text.to_string())
    }

    /// Produce a reply in the requested character's voice. Never fails.
    pub async fn compose(&self, request: &DialogueRequest<'_>) -> String {
        let prompt = Self::build_prompt(request);
        let max_tokens = request.max_tokens.unwrap_or(self.max_tokens);

        match self.generate(&prompt, max_tokens).await {
            Ok(text) => {
                debug!("Generated {} chars of dialogue for {}", text.len(), request.character.name());
                text
            }
            Err(e) => {
                warn!(
                    "Dialogue generation failed for {}, using fallback line: {}",
                    request.character.name(),
                    e
                );
                request.character.fallback_line().to_string()
            }
        }
    }
}
