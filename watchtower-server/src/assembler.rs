//! Dashboard and chat pipelines
//!
//! Both run strictly in sequence: resolve, fetch, select, compose, then
//! synthesize. Only location and forecast failures abort a request; text
//! and speech problems degrade the reply instead.

use crate::payload::{
    ChatReply, ChatRequest, CurrentWeatherView, DashboardPayload, DashboardQuery, ForecastView,
    HeroView, LocationView,
};
use crate::upstream::{LocationNaming, WeatherLookup};
use std::sync::Arc;
use tracing::{debug, info};
use watchtower_core::{
    Character, Coordinates, ConversationTurn, Error, PersonaCatalog, PersonaSelector,
    ResolvedLocation, Result,
};
use watchtower_llm::{DialogueComposer, DialogueRequest};
use watchtower_spk::SpeechSynthesizer;

const MISSING_LOCATION: &str = "Either location name or coordinates must be provided.";

pub struct ResponseAssembler {
    weather: Arc<dyn WeatherLookup>,
    naming: Arc<dyn LocationNaming>,
    selector: PersonaSelector,
    composer: DialogueComposer,
    speech: SpeechSynthesizer,
    chat_max_tokens: u32,
}

impl ResponseAssembler {
    pub fn new(
        weather: Arc<dyn WeatherLookup>,
        naming: Arc<dyn LocationNaming>,
        composer: DialogueComposer,
        speech: SpeechSynthesizer,
    ) -> Self {
        let chat_max_tokens = composer.max_tokens();
        Self {
            weather,
            naming,
            selector: PersonaSelector::default(),
            composer,
            speech,
            chat_max_tokens,
        }
    }

    pub fn with_selector(mut self, selector: PersonaSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Token limit for chat replies, which run longer than dashboard lines.
    pub fn with_chat_max_tokens(mut self, max_tokens: u32) -> Self {
        self.chat_max_tokens = max_tokens;
        self
    }

    pub fn naming(&self) -> &Arc<dyn LocationNaming> {
        &self.naming
    }

    pub fn catalog(&self) -> &'static PersonaCatalog {
        self.selector.catalog()
    }

    /// Coordinates win over a name; a name that geocodes to nothing is
    /// `NotFound`.
    pub async fn resolve_location(&self, query: &DashboardQuery) -> Result<ResolvedLocation> {
        if let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) {
            let coordinates = Coordinates::new(latitude, longitude);
            if !coordinates.is_valid() {
                return Err(Error::InvalidRequest(format!(
                    "Coordinates out of range: ({}, {})",
                    latitude, longitude
                )));
            }
            let name = self.naming.name_for_coordinates(latitude, longitude).await;
            return Ok(ResolvedLocation {
                name,
                latitude,
                longitude,
                country: None,
            });
        }

        match query.location.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => self
                .naming
                .coordinates_for_name(name)
                .await?
                .ok_or_else(|| Error::NotFound(name.to_string())),
            _ => Err(Error::InvalidRequest(MISSING_LOCATION.to_string())),
        }
    }

    /// Build the full dashboard for a location.
    ///
    /// The latest user turn in `turns` is the question; earlier turns are
    /// context.
    pub async fn dashboard(
        &self,
        query: &DashboardQuery,
        turns: &[ConversationTurn],
    ) -> Result<DashboardPayload> {
        let location = self.resolve_location(query).await?;
        let report = self
            .weather
            .fetch_current_and_forecast(location.latitude, location.longitude)
            .await?;

        let snapshot = report.current.snapshot();
        let (persona, rule) = self.selector.select_with_rule(&snapshot);
        info!(
            "Dashboard for {}: '{}' selects {} ({:?})",
            location.name,
            snapshot.condition(),
            persona.name,
            rule
        );

        let (message, context) = ConversationTurn::split_latest_user(turns);
        let request = DialogueRequest::new(persona)
            .with_weather(&snapshot)
            .with_location(&location.name)
            .with_message(message)
            .with_turns(context);
        let dialogue = self.composer.compose(&request).await;
        let audio_url = self.speech.synthesize(&dialogue, Character::from(persona)).await;

        Ok(DashboardPayload {
            location: LocationView {
                name: location.name,
                latitude: location.latitude,
                longitude: location.longitude,
            },
            current_weather: CurrentWeatherView::from(&report.current),
            daily_forecast: report.daily.iter().map(ForecastView::from).collect(),
            hero: HeroView {
                name: persona.name.to_string(),
                dialogue,
                image_url: None,
                audio_url,
            },
        })
    }

    /// Reply in the caller's chosen persona. Never fails.
    pub async fn chat(&self, request: &ChatRequest) -> ChatReply {
        let character = self.catalog().resolve(&request.current_hero);
        if character.id().is_none() {
            debug!("Unknown hero '{}', using generic character", request.current_hero);
        }

        let snapshot = request.weather_data.as_ref().and_then(|w| w.snapshot());
        let location = request
            .location_data
            .as_ref()
            .and_then(|l| l.name.as_deref());

        let mut dialogue = DialogueRequest::new(character)
            .with_message(Some(request.message.as_str()))
            .with_turns(&request.chat_history)
            .with_max_tokens(self.chat_max_tokens);
        if let Some(snapshot) = snapshot.as_ref() {
            dialogue = dialogue.with_weather(snapshot);
        }
        if let Some(location) = location {
            dialogue = dialogue.with_location(location);
        }

        let response = self.composer.compose(&dialogue).await;
        let audio_url = self.speech.synthesize(&response, character).await;
        ChatReply { response, audio_url }
    }
}
