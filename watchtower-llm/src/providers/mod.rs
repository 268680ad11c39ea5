pub mod trait_impl;
pub mod openai;
pub mod anthropic;

pub use trait_impl::Provider as ProviderTrait;
pub use crate::config::Provider;

use crate::error::{LLMError, Result};
use std::time::Duration;

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 500;
const MAX_MODEL_NAME_CHARS: usize = 100;

/// Keep only characters that can appear in a model identifier.
pub(crate) fn sanitize_model(model: Option<&str>, fallback: &str) -> String {
    let sanitized: String = model
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .take(MAX_MODEL_NAME_CHARS)
        .collect();
    if sanitized.is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}

/// Map non-success statuses onto provider errors.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(LLMError::RateLimit);
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(LLMError::AuthenticationFailed);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let body: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(LLMError::InvalidResponse(format!("HTTP {}: {}", status, body)));
    }
    Ok(response)
}

pub(crate) fn key_prefix(api_key: &str) -> &str {
    api_key.get(..8).filter(|_| api_key.len() > 8).unwrap_or("***")
}
