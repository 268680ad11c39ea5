//! watchtower-server: HTTP surface for the weather dashboard
//!
//! Resolves locations, fetches forecasts, and returns the hero selected for
//! the weather together with their dialogue and an optional audio clip.

pub mod assembler;
pub mod config;
pub mod error;
pub mod http;
pub mod open_meteo;
pub mod payload;
pub mod startup;
pub mod static_files;
pub mod upstream;

pub use assembler::ResponseAssembler;
pub use config::{ConfigError, ServerConfig, UpstreamConfig, WatchtowerConfig};
pub use error::{ApiError, ErrorResponse};
pub use http::{create_router, ApiState};
pub use startup::{build_state, StartupError};
pub use upstream::{LocationNaming, WeatherLookup, CURRENT_LOCATION_NAME};
