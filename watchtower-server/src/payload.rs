// Request and response bodies exchanged with the dashboard front end

use serde::{Deserialize, Serialize};
use watchtower_core::{
    ConversationTurn, CurrentConditions, ForecastDay, ResolvedLocation, WeatherSnapshot,
};

/// Where the dashboard should report on
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DashboardQuery {
    pub fn named(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }
}

/// Body of `POST /api/get-weather-dashboard`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardRequest {
    #[serde(flatten)]
    pub query: DashboardQuery,
    pub chat_history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeatherView {
    pub temperature: Option<f64>,
    pub condition: String,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub feels_like: Option<f64>,
    /// Air quality is not collected; always null
    pub aqi: Option<f64>,
    #[serde(rename = "wind_kph")]
    pub wind_kph: Option<f64>,
    pub time: Option<String>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloud_cover: Option<f64>,
    /// 1 for day, 0 for night
    pub is_day: u8,
}

impl From<&CurrentConditions> for CurrentWeatherView {
    fn from(c: &CurrentConditions) -> Self {
        Self {
            temperature: c.temperature_c,
            condition: c.condition.clone(),
            humidity: c.humidity_pct,
            wind_speed: c.wind_kmh,
            feels_like: c.apparent_temperature_c,
            aqi: None,
            wind_kph: c.wind_kmh,
            time: c.time.clone(),
            pressure: c.pressure_hpa,
            precipitation: c.precipitation_mm,
            cloud_cover: c.cloud_cover_pct,
            is_day: u8::from(c.is_day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastView {
    pub date: String,
    pub day: String,
    #[serde(rename = "weather_code")]
    pub weather_code: Option<u16>,
    pub condition: String,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

impl From<&ForecastDay> for ForecastView {
    fn from(d: &ForecastDay) -> Self {
        Self {
            date: d.date.clone(),
            day: d.weekday.clone(),
            weather_code: d.weather_code,
            condition: d.condition.clone(),
            min_temp: d.min_temp_c,
            max_temp: d.max_temp_c,
            precipitation: d.precipitation_mm,
            precipitation_probability: d.precipitation_probability_pct,
            wind_speed: d.max_wind_kmh,
            wind_direction: d.wind_direction_deg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroView {
    pub name: String,
    pub dialogue: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub location: LocationView,
    pub current_weather: CurrentWeatherView,
    pub daily_forecast: Vec<ForecastView>,
    pub hero: HeroView,
}

/// Weather context echoed back by the chat panel; the dashboard's
/// `currentWeather` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatWeather {
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub humidity: Option<f64>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<f64>,
    pub wind_kph: Option<f64>,
    #[serde(rename = "isDay")]
    pub is_day: Option<serde_json::Value>,
}

impl ChatWeather {
    /// Snapshot for prompting; `None` without a temperature reading.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        let temperature = self.temperature?;
        let is_day = match &self.is_day {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::Number(n)) => n.as_f64().map_or(true, |v| v != 0.0),
            _ => true,
        };
        let snapshot = WeatherSnapshot::new(
            temperature,
            self.condition.as_deref().unwrap_or_default(),
            self.wind_kph.or(self.wind_speed),
            is_day,
        )
        .with_humidity(self.humidity);
        Some(snapshot)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatLocation {
    pub name: Option<String>,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub current_hero: String,
    pub weather_data: Option<ChatWeather>,
    pub location_data: Option<ChatLocation>,
    pub chat_history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub audio_url: Option<String>,
}

/// Body of the geocode routes on success
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: Option<String>,
}

impl From<ResolvedLocation> for GeocodeResponse {
    fn from(location: ResolvedLocation) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            city: location.name,
            country: location.country,
        }
    }
}
