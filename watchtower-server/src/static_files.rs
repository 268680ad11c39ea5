// Serves stored audio artifacts

use crate::http::ApiState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use tracing::warn;

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

fn content_type(file: &str) -> &'static str {
    match file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp3" => "audio/mpeg",
        Some(ext) if ext == "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// Reject anything that could leave the static directory.
pub fn is_safe_file_name(file: &str) -> bool {
    !file.is_empty()
        && !file.contains("..")
        && !file.contains('/')
        && !file.contains('\\')
        && !file.contains('\0')
        && !file.starts_with('.')
}

pub async fn serve_static(State(state): State<ApiState>, Path(file): Path<String>) -> impl IntoResponse {
    if !is_safe_file_name(&file) {
        warn!("Rejected static path '{}'", file);
        return plain(StatusCode::BAD_REQUEST, "Invalid path");
    }

    let path = state.static_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(content_type(&file)),
            );
            response
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => plain(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
