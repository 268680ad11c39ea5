use thiserror::Error;

/// Failures that abort a dashboard or chat operation.
///
/// Degraded generation and synthesis never show up here; those are
/// recovered inside the pipeline and only lower the quality of the reply.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Location '{0}' not found.")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether the caller sent something unusable (4xx) rather than the
    /// service failing (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::InvalidRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
