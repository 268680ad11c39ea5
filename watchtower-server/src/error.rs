// HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// A failed request as seen by the client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: "INVALID_REQUEST",
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            code: "NOT_FOUND",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            code: "INTERNAL_ERROR",
        }
    }
}

impl From<watchtower_core::Error> for ApiError {
    fn from(err: watchtower_core::Error) -> Self {
        use watchtower_core::Error;
        match err {
            Error::NotFound(_) => {
                warn!("{}", err);
                ApiError::not_found(err.to_string())
            }
            Error::InvalidRequest(msg) => {
                warn!("Rejected request: {}", msg);
                ApiError::bad_request(msg)
            }
            Error::UpstreamUnavailable(msg) => {
                // Upstream details stay in the log
                error!("Upstream failure: {}", msg);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Could not retrieve weather data.".to_string(),
                    code: "UPSTREAM_UNAVAILABLE",
                }
            }
            Error::Configuration(msg) => {
                error!("Internal failure: {}", msg);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
