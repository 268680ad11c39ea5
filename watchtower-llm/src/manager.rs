use crate::config::*;
use crate::error::{LLMError, Result};
use crate::generator::TextGenerator;
use crate::providers::trait_impl::Provider as ProviderTrait;
use crate::providers::{anthropic::AnthropicProvider, openai::OpenAIProvider};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_MESSAGES: usize = 100;
const MAX_MESSAGE_BYTES: usize = 100_000;
const MAX_TOTAL_BYTES: usize = 1_000_000;

/// Routes chat requests to the configured provider.
///
/// Providers are held behind `Arc` so a request never keeps the registry
/// lock across an await point.
pub struct LLMManager {
    providers: RwLock<HashMap<Provider, Arc<ProviderBox>>>,
    default_provider: RwLock<Option<Provider>>,
    config: RwLock<LLMConfig>,
}

enum ProviderBox {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
}

#[async_trait]
impl ProviderTrait for ProviderBox {
    fn name(&self) -> &'static str {
        match self {
            ProviderBox::OpenAI(p) => p.name(),
            ProviderBox::Anthropic(p) => p.name(),
        }
    }

    fn has_api_key(&self) -> bool {
        match self {
            ProviderBox::OpenAI(p) => p.has_api_key(),
            ProviderBox::Anthropic(p) => p.has_api_key(),
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self {
            ProviderBox::OpenAI(p) => p.chat(request).await,
            ProviderBox::Anthropic(p) => p.chat(request).await,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderBox::OpenAI(p) => p.default_model(),
            ProviderBox::Anthropic(p) => p.default_model(),
        }
    }
}

impl LLMManager {
    /// Manager with default settings and no providers.
    pub fn new() -> Self {
        Self::with_config(LLMConfig::default())
    }

    /// Manager with a provider registered for every key present in `config`.
    pub fn with_config(config: LLMConfig) -> Self {
        let manager = Self {
            providers: RwLock::new(HashMap::new()),
            default_provider: RwLock::new(None),
            config: RwLock::new(config.clone()),
        };

        for provider in Provider::ALL {
            if let Some(key) = config.api_key(provider) {
                manager.set_api_key(provider, key.to_string());
            }
        }

        if let Some(preferred) = config.default_provider {
            if manager.has_provider(preferred) {
                *manager.default_provider.write() = Some(preferred);
            } else {
                tracing::warn!(
                    "Default provider {} has no API key; falling back to any configured provider",
                    preferred.as_str()
                );
            }
        }

        manager
    }

    /// Set API key for a provider
    pub fn set_api_key(&self, provider: Provider, key: String) {
        if key.is_empty() {
            tracing::warn!("Empty API key provided for {:?}", provider);
            return;
        }

        if key.len() > 1000 {
            tracing::warn!("API key too long for {:?}", provider);
            return;
        }

        if provider == Provider::OpenAI && !key.starts_with("sk-") {
            tracing::debug!("API key format may be invalid for {:?}", provider);
        }

        let timeout = self.config.read().timeout();
        let provider_box = match provider {
            Provider::OpenAI => {
                ProviderBox::OpenAI(OpenAIProvider::with_api_key(key).with_timeout(timeout))
            }
            Provider::Anthropic => {
                ProviderBox::Anthropic(AnthropicProvider::with_api_key(key).with_timeout(timeout))
            }
        };
        self.providers.write().insert(provider, Arc::new(provider_box));

        let mut default = self.default_provider.write();
        if default.is_none() {
            *default = Some(provider);
        }
    }

    pub fn has_provider(&self, provider: Provider) -> bool {
        self.providers.read().contains_key(&provider)
    }

    pub fn default_provider(&self) -> Option<Provider> {
        *self.default_provider.read()
    }

    pub fn config(&self) -> LLMConfig {
        self.config.read().clone()
    }

    fn get_provider(&self, provider: Option<Provider>) -> Result<Arc<ProviderBox>> {
        let provider = provider
            .or_else(|| *self.default_provider.read())
            .ok_or_else(|| LLMError::MissingApiKey("No provider configured".to_string()))?;

        self.providers
            .read()
            .get(&provider)
            .cloned()
            .ok_or_else(|| LLMError::MissingApiKey(format!("Provider {:?} not configured", provider)))
    }

    fn validate_messages(messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Err(LLMError::InvalidRequest("Messages cannot be empty".to_string()));
        }

        if messages.len() > MAX_MESSAGES {
            return Err(LLMError::InvalidRequest(format!(
                "Too many messages (max {})",
                MAX_MESSAGES
            )));
        }

        let mut total = 0usize;
        for msg in messages {
            if msg.content.len() > MAX_MESSAGE_BYTES {
                return Err(LLMError::InvalidRequest(
                    "Individual message too large (max 100KB)".to_string(),
                ));
            }
            total = total.saturating_add(msg.content.len());
        }
        if total > MAX_TOTAL_BYTES {
            return Err(LLMError::InvalidRequest(
                "Total message content too large (max 1MB)".to_string(),
            ));
        }
        Ok(())
    }

    /// Chat completion with the configured token limit and temperature.
    pub async fn chat(&self, messages: Vec<Message>, provider: Option<Provider>) -> Result<String> {
        let (max_tokens, temperature) = {
            let config = self.config.read();
            (config.max_tokens, config.temperature)
        };
        self.complete(messages, max_tokens, temperature, provider).await
    }

    /// Chat completion with explicit sampling parameters.
    pub async fn complete(
        &self,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f32,
        provider: Option<Provider>,
    ) -> Result<String> {
        Self::validate_messages(&messages)?;

        let provider_box = self.get_provider(provider)?;
        let request = ChatRequest {
            messages,
            model: self.config.read().default_model.clone(),
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        };

        tracing::debug!(
            "Sending {} message(s) to {} (max_tokens={})",
            request.messages.len(),
            provider_box.name(),
            max_tokens
        );

        let response = provider_box.chat(request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                "{} used {} tokens ({} prompt, {} completion)",
                response.model,
                usage.total_tokens,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(response.content)
    }
}

impl Default for LLMManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for LLMManager {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let system_prompt = self.config.read().system_prompt.clone();
        let messages = vec![Message::system(system_prompt), Message::user(prompt)];
        self.complete(messages, max_tokens, temperature, None).await
    }
}
