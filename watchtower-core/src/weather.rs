//! Weather readings as consumed by persona selection and dialogue

use serde::{Deserialize, Serialize};

/// Part of the day a reading was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Daypart {
    Day,
    Night,
}

impl Daypart {
    pub fn from_is_day(is_day: bool) -> Self {
        if is_day {
            Daypart::Day
        } else {
            Daypart::Night
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Day => "day",
            Daypart::Night => "night",
        }
    }
}

/// Normalized current conditions.
///
/// Condition text is lowercased and trimmed on construction so keyword
/// triggers can use plain substring matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    temperature_c: Option<f64>,
    condition: String,
    wind_kmh: Option<f64>,
    is_day: bool,
    humidity_pct: Option<f64>,
}

impl WeatherSnapshot {
    pub fn new(
        temperature_c: impl Into<Option<f64>>,
        condition: &str,
        wind_kmh: Option<f64>,
        is_day: bool,
    ) -> Self {
        Self {
            temperature_c: temperature_c.into().filter(|t| t.is_finite()),
            condition: condition.trim().to_lowercase(),
            wind_kmh,
            is_day,
            humidity_pct: None,
        }
    }

    pub fn with_humidity(mut self, humidity_pct: Option<f64>) -> Self {
        self.humidity_pct = humidity_pct;
        self
    }

    /// Air temperature in °C, when the reading was present.
    pub fn temperature_c(&self) -> Option<f64> {
        self.temperature_c
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Wind speed in km/h; a missing reading counts as calm.
    pub fn wind_kmh(&self) -> f64 {
        match self.wind_kmh {
            Some(w) if w.is_finite() => w,
            _ => 0.0,
        }
    }

    pub fn measured_wind_kmh(&self) -> Option<f64> {
        self.wind_kmh
    }

    pub fn is_day(&self) -> bool {
        self.is_day
    }

    pub fn daypart(&self) -> Daypart {
        Daypart::from_is_day(self.is_day)
    }

    pub fn humidity_pct(&self) -> Option<f64> {
        self.humidity_pct
    }

    /// True if the condition text contains any of the keywords.
    pub fn condition_contains_any(&self, keywords: &[&str]) -> bool {
        !self.condition.is_empty()
            && keywords
                .iter()
                .any(|k| !k.is_empty() && self.condition.contains(&k.to_lowercase()))
    }
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Range check; NaN and out-of-range values are rejected.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A place resolved to coordinates plus a name fit for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Full current-conditions row as returned by the forecast service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub weather_code: Option<u16>,
    pub condition: String,
    pub humidity_pct: Option<f64>,
    pub wind_kmh: Option<f64>,
    pub apparent_temperature_c: Option<f64>,
    pub time: Option<String>,
    pub pressure_hpa: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub is_day: bool,
}

impl CurrentConditions {
    /// Reduce to the fields persona selection and dialogue care about.
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot::new(
            self.temperature_c,
            &self.condition,
            self.wind_kmh,
            self.is_day,
        )
        .with_humidity(self.humidity_pct)
    }
}

/// One day of the multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub weekday: String,
    pub weather_code: Option<u16>,
    pub condition: String,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub precipitation_probability_pct: Option<f64>,
    pub max_wind_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
}

/// Current conditions together with the daily forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: Vec<ForecastDay>,
}
