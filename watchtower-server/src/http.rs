// HTTP server with the dashboard, chat and geocoding routes

use crate::assembler::ResponseAssembler;
use crate::error::{ApiError, ErrorResponse};
use crate::payload::{ChatReply, ChatRequest, DashboardPayload, DashboardQuery, DashboardRequest, GeocodeResponse};
use crate::static_files::serve_static;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

// API state
#[derive(Clone)]
pub struct ApiState {
    pub assembler: Arc<ResponseAssembler>,
    pub static_dir: Arc<PathBuf>,
}

impl ApiState {
    pub fn new(assembler: Arc<ResponseAssembler>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            assembler,
            static_dir: Arc::new(static_dir.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    #[serde(rename = "Status")]
    status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub location: String,
}

/// Routes under `url_prefix` serve stored audio.
pub fn create_router(state: ApiState, url_prefix: &str) -> Router {
    let static_route = format!("{}/:file", url_prefix.trim_end_matches('/'));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/get-weather-dashboard", post(dashboard_handler))
        .route("/api/weather", get(weather_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/health", get(chat_health_handler))
        .route("/geocode", get(geocode_handler))
        .route("/api/geocode", get(geocode_handler))
        .route(&static_route, get(serve_static))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

async fn root_handler() -> impl IntoResponse {
    Json(RootResponse {
        status: "Watchtower API is online",
    })
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn chat_health_handler() -> impl IntoResponse {
    Json(ChatHealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn dashboard_handler(
    State(state): State<ApiState>,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardPayload>, ApiError> {
    let payload = state
        .assembler
        .dashboard(&request.query, &request.chat_history)
        .await?;
    Ok(Json(payload))
}

async fn weather_handler(
    State(state): State<ApiState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<DashboardPayload>, ApiError> {
    let query = DashboardQuery::at(params.latitude, params.longitude);
    let payload = state.assembler.dashboard(&query, &[]).await?;
    Ok(Json(payload))
}

async fn chat_handler(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatReply> {
    info!("Chat request for hero '{}'", request.current_hero);
    Json(state.assembler.chat(&request).await)
}

async fn geocode_handler(
    State(state): State<ApiState>,
    Query(params): Query<GeocodeParams>,
) -> Result<Response, ApiError> {
    let location = params.location.trim();
    if location.is_empty() {
        return Err(ApiError::bad_request("Location parameter is missing"));
    }

    match state.assembler.naming().coordinates_for_name(location).await? {
        Some(resolved) => Ok(Json(GeocodeResponse::from(resolved)).into_response()),
        None => Ok((
            StatusCode::OK,
            Json(ErrorResponse {
                error: "Location not found".to_string(),
                code: "NOT_FOUND".to_string(),
            }),
        )
            .into_response()),
    }
}
