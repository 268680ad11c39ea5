//! Text generation capability consumed by the dialogue composer

use crate::error::Result;
use async_trait::async_trait;

/// Produces free text for a prompt.
///
/// Implementations own the system framing; callers pass only the user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}
