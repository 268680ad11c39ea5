// Deterministic stand-ins for the external services

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use watchtower_core::{CurrentConditions, Error, ForecastDay, ResolvedLocation, Result, WeatherReport};
use watchtower_llm::{DialogueComposer, LLMConfig, LLMError, TextGenerator};
use watchtower_server::{LocationNaming, ResponseAssembler, WeatherLookup};
use watchtower_spk::config::{SpeechConfig, VoiceConfig};
use watchtower_spk::engines::custom::CustomTtsEngine;
use watchtower_spk::engines::TtsEngine;
use watchtower_spk::error::SpeechError;
use watchtower_spk::store::{ArtifactStore, FileArtifactStore};
use watchtower_spk::SpeechSynthesizer;

pub fn conditions(condition: &str, code: u16, wind_kmh: f64, is_day: bool) -> CurrentConditions {
    CurrentConditions {
        temperature_c: Some(14.0),
        weather_code: Some(code),
        condition: condition.to_string(),
        humidity_pct: Some(72.0),
        wind_kmh: Some(wind_kmh),
        apparent_temperature_c: Some(12.5),
        time: Some("2024-06-03T14:00".to_string()),
        pressure_hpa: Some(1011.0),
        precipitation_mm: Some(0.0),
        cloud_cover_pct: Some(40.0),
        is_day,
    }
}

pub fn report(current: CurrentConditions) -> WeatherReport {
    WeatherReport {
        current,
        daily: vec![ForecastDay {
            date: "2024-06-03".to_string(),
            weekday: "Monday".to_string(),
            weather_code: Some(63),
            condition: "Moderate rain".to_string(),
            min_temp_c: Some(10.0),
            max_temp_c: Some(17.0),
            precipitation_mm: Some(4.2),
            precipitation_probability_pct: Some(85.0),
            max_wind_kmh: Some(22.0),
            wind_direction_deg: Some(240.0),
        }],
    }
}

/// Returns a fixed report, or an upstream failure when `report` is `None`.
pub struct FakeWeather {
    report: Option<WeatherReport>,
    pub calls: Mutex<Vec<(f64, f64)>>,
}

impl FakeWeather {
    pub fn returning(report: WeatherReport) -> Arc<Self> {
        Arc::new(Self {
            report: Some(report),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            report: None,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl WeatherLookup for FakeWeather {
    async fn fetch_current_and_forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherReport> {
        self.calls.lock().push((latitude, longitude));
        self.report
            .clone()
            .ok_or_else(|| Error::UpstreamUnavailable("forecast service returned 503".to_string()))
    }
}

/// Knows a handful of places; reverse lookups always answer `reverse_name`.
pub struct FakeNaming {
    places: HashMap<String, ResolvedLocation>,
    reverse_name: String,
}

impl FakeNaming {
    pub fn new() -> Arc<Self> {
        let mut places = HashMap::new();
        for (name, lat, lon, country) in [
            ("Gotham", 40.71, -74.0, "United States"),
            ("Paris", 48.85, 2.35, "France"),
        ] {
            places.insert(
                name.to_lowercase(),
                ResolvedLocation {
                    name: name.to_string(),
                    latitude: lat,
                    longitude: lon,
                    country: Some(country.to_string()),
                },
            );
        }
        Arc::new(Self {
            places,
            reverse_name: "Lisbon, Portugal".to_string(),
        })
    }
}

#[async_trait]
impl LocationNaming for FakeNaming {
    async fn name_for_coordinates(&self, _latitude: f64, _longitude: f64) -> String {
        self.reverse_name.clone()
    }

    async fn coordinates_for_name(&self, name: &str) -> Result<Option<ResolvedLocation>> {
        Ok(self.places.get(&name.to_lowercase()).cloned())
    }
}

/// Records prompts and token limits, answering with a fixed reply or failing.
pub struct FakeGenerator {
    reply: Option<String>,
    pub calls: Mutex<Vec<(String, u32)>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> String {
        self.calls.lock().last().map(|c| c.0.clone()).unwrap_or_default()
    }

    pub fn last_max_tokens(&self) -> Option<u32> {
        self.calls.lock().last().map(|c| c.1)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32, _temperature: f32) -> watchtower_llm::Result<String> {
        self.calls.lock().push((prompt.to_string(), max_tokens));
        self.reply
            .clone()
            .ok_or_else(|| LLMError::Provider("model overloaded".to_string()))
    }
}

pub type SpeechCalls = Arc<Mutex<Vec<(String, VoiceConfig)>>>;

pub fn recording_engine(calls: SpeechCalls) -> Arc<dyn TtsEngine> {
    Arc::new(CustomTtsEngine::from_fn("recording", move |text: &str, voice: &VoiceConfig| {
        calls.lock().push((text.to_string(), voice.clone()));
        Ok(Bytes::from_static(b"ID3fake-mp3"))
    }))
}

pub fn failing_engine() -> Arc<dyn TtsEngine> {
    Arc::new(CustomTtsEngine::from_fn("failing", |_text: &str, _voice: &VoiceConfig| {
        Err(SpeechError::Api("500 Internal Server Error".to_string()))
    }))
}

pub fn speech(engine: Option<Arc<dyn TtsEngine>>, dir: &TempDir) -> SpeechSynthesizer {
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    match engine {
        Some(engine) => SpeechSynthesizer::with_engine(SpeechConfig::default(), engine, store).unwrap(),
        None => SpeechSynthesizer::disabled(store),
    }
}

pub fn assembler(
    weather: Arc<FakeWeather>,
    generator: Arc<FakeGenerator>,
    engine: Option<Arc<dyn TtsEngine>>,
    dir: &TempDir,
) -> ResponseAssembler {
    let config = LLMConfig::default();
    let composer = DialogueComposer::from_config(generator, &config);
    ResponseAssembler::new(weather, FakeNaming::new(), composer, speech(engine, dir))
        .with_chat_max_tokens(config.chat_max_tokens)
}
