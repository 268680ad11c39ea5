//! Weather and geocoding collaborators
//!
//! The assembler only talks to these traits; [`crate::open_meteo`] holds the
//! HTTP implementations.

use async_trait::async_trait;
use watchtower_core::{ResolvedLocation, Result, WeatherReport};

/// Name used when reverse geocoding yields nothing usable
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Current conditions plus the daily forecast for a coordinate pair.
    async fn fetch_current_and_forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherReport>;
}

#[async_trait]
pub trait LocationNaming: Send + Sync {
    /// Display name for coordinates. Never fails; falls back to
    /// [`CURRENT_LOCATION_NAME`].
    async fn name_for_coordinates(&self, latitude: f64, longitude: f64) -> String;

    /// Forward geocode a place name. `Ok(None)` means the name is unknown.
    async fn coordinates_for_name(&self, name: &str) -> Result<Option<ResolvedLocation>>;
}
