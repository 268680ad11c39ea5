//! Open-Meteo forecast and geocoding clients, BigDataCloud reverse geocoding

use crate::config::UpstreamConfig;
use crate::upstream::{LocationNaming, WeatherLookup, CURRENT_LOCATION_NAME};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use watchtower_core::{
    CurrentConditions, Error, ForecastDay, ResolvedLocation, Result, WeatherReport,
};

const CURRENT_FIELDS: &str = "temperature_2m,is_day,weather_code,wind_speed_10m,relative_humidity_2m,apparent_temperature,pressure_msl,precipitation,cloud_cover";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max,windspeed_10m_max,winddirection_10m_dominant";

/// Human-readable text for a WMO weather interpretation code.
pub fn wmo_condition(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn build_client(config: &UpstreamConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))
}

fn upstream_error(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::UpstreamUnavailable(format!("{} request timed out", service))
    } else {
        Error::UpstreamUnavailable(format!("{} request failed: {}", service, err))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    current: Option<CurrentBlock>,
    #[serde(default)]
    daily: DailyBlock,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentBlock {
    time: Option<String>,
    temperature_2m: Option<f64>,
    is_day: Option<u8>,
    weather_code: Option<u16>,
    wind_speed_10m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    pressure_msl: Option<f64>,
    precipitation: Option<f64>,
    cloud_cover: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<Option<u16>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    windspeed_10m_max: Vec<Option<f64>>,
    winddirection_10m_dominant: Vec<Option<f64>>,
}

fn at<T: Copy>(values: &[Option<T>], idx: usize) -> Option<T> {
    values.get(idx).copied().flatten()
}

impl CurrentBlock {
    fn into_conditions(self) -> CurrentConditions {
        let condition = match self.weather_code {
            Some(code) => wmo_condition(code),
            // Not read as code 0: a missing code must not pass for "Clear sky"
            // and pull in the clear-day persona.
            None => "Unknown",
        };
        CurrentConditions {
            temperature_c: self.temperature_2m,
            weather_code: self.weather_code,
            condition: condition.to_string(),
            humidity_pct: self.relative_humidity_2m,
            wind_kmh: self.wind_speed_10m,
            apparent_temperature_c: self.apparent_temperature,
            time: self.time,
            pressure_hpa: self.pressure_msl,
            precipitation_mm: self.precipitation,
            cloud_cover_pct: self.cloud_cover,
            // A missing flag is read as daytime
            is_day: self.is_day.map_or(true, |flag| flag != 0),
        }
    }
}

impl DailyBlock {
    fn into_days(self) -> Vec<ForecastDay> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let weather_code = at(&self.weather_code, i);
                ForecastDay {
                    date: date.clone(),
                    weekday: weekday_name(date),
                    weather_code,
                    condition: weather_code.map_or("Unknown", wmo_condition).to_string(),
                    min_temp_c: at(&self.temperature_2m_min, i),
                    max_temp_c: at(&self.temperature_2m_max, i),
                    precipitation_mm: at(&self.precipitation_sum, i),
                    precipitation_probability_pct: at(&self.precipitation_probability_max, i),
                    max_wind_kmh: at(&self.windspeed_10m_max, i),
                    wind_direction_deg: at(&self.winddirection_10m_dominant, i),
                }
            })
            .collect()
    }
}

/// Full weekday name for an ISO date, empty when the date does not parse.
pub fn weekday_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_default()
}

/// Decode an Open-Meteo forecast response.
pub fn parse_forecast(body: serde_json::Value) -> Result<WeatherReport> {
    let body: ForecastBody = serde_json::from_value(body)
        .map_err(|e| Error::UpstreamUnavailable(format!("Malformed forecast response: {}", e)))?;
    let current = body
        .current
        .ok_or_else(|| Error::UpstreamUnavailable("Forecast response has no current conditions".to_string()))?;

    Ok(WeatherReport {
        current: current.into_conditions(),
        daily: body.daily.into_days(),
    })
}

/// Open-Meteo forecast client
pub struct OpenMeteoForecast {
    client: Client,
    url: String,
    forecast_days: u8,
}

impl OpenMeteoForecast {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.forecast_url.clone(),
            forecast_days: config.forecast_days,
        })
    }
}

#[async_trait]
impl WeatherLookup for OpenMeteoForecast {
    async fn fetch_current_and_forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherReport> {
        debug!("Fetching forecast for ({}, {})", latitude, longitude);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
            ])
            .send()
            .await
            .map_err(|e| upstream_error("Forecast", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "Forecast service returned {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| upstream_error("Forecast", e))?;
        parse_forecast(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingBody {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReverseBody {
    city: String,
    locality: String,
    country_name: String,
}

/// First geocoding hit, if any.
pub fn parse_geocoding(body: serde_json::Value) -> Result<Option<ResolvedLocation>> {
    let body: GeocodingBody = serde_json::from_value(body)
        .map_err(|e| Error::UpstreamUnavailable(format!("Malformed geocoding response: {}", e)))?;
    Ok(body.results.into_iter().next().map(|r| ResolvedLocation {
        name: r.name,
        latitude: r.latitude,
        longitude: r.longitude,
        country: r.country,
    }))
}

/// "City, Country" from a reverse geocoding response.
pub fn parse_reverse_name(body: serde_json::Value) -> String {
    let body: ReverseBody = serde_json::from_value(body).unwrap_or_default();
    let place = if body.city.trim().is_empty() { body.locality } else { body.city };
    let parts: Vec<&str> = [place.trim(), body.country_name.trim()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        CURRENT_LOCATION_NAME.to_string()
    } else {
        parts.join(", ")
    }
}

/// Forward geocoding through Open-Meteo, reverse through BigDataCloud
pub struct HttpGeocoder {
    client: Client,
    geocoding_url: String,
    reverse_url: String,
}

impl HttpGeocoder {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            geocoding_url: config.geocoding_url.clone(),
            reverse_url: config.reverse_geocoding_url.clone(),
        })
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> std::result::Result<String, reqwest::Error> {
        let body: serde_json::Value = self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_reverse_name(body))
    }
}

#[async_trait]
impl LocationNaming for HttpGeocoder {
    async fn name_for_coordinates(&self, latitude: f64, longitude: f64) -> String {
        match self.reverse(latitude, longitude).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Reverse geocoding failed for ({}, {}): {}", latitude, longitude, e);
                CURRENT_LOCATION_NAME.to_string()
            }
        }
    }

    async fn coordinates_for_name(&self, name: &str) -> Result<Option<ResolvedLocation>> {
        debug!("Geocoding '{}'", name);
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", name), ("count", "1"), ("format", "json")])
            .send()
            .await
            .map_err(|e| upstream_error("Geocoding", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "Geocoding service returned {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| upstream_error("Geocoding", e))?;
        parse_geocoding(body)
    }
}
