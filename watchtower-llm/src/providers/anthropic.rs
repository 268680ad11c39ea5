use async_trait::async_trait;
use crate::config::*;
use crate::error::{LLMError, Result};
use crate::providers::trait_impl::Provider as ProviderTrait;
use crate::providers::{check_status, key_prefix, sanitize_model, DEFAULT_REQUEST_TIMEOUT};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub struct AnthropicProvider {
    api_key: Option<String>,
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new() -> Self {
        Self {
            api_key: None,
            client: Client::new(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_key(api_key: String) -> Self {
        Self {
            api_key: Some(api_key),
            ..Self::new()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .ok_or_else(|| LLMError::MissingApiKey("Anthropic".to_string()))
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Split out the system prompt; Anthropic takes it as a top-level field.
pub(crate) fn to_anthropic_messages(messages: &[Message]) -> (Option<String>, Vec<serde_json::Value>) {
    let mut system: Option<String> = None;
    let mut converted = Vec::new();
    for msg in messages {
        match msg.role {
            MessageRole::System => {
                system = Some(match system {
                    Some(existing) => format!("{}\n\n{}", existing, msg.content),
                    None => msg.content.clone(),
                });
            }
            MessageRole::User | MessageRole::Assistant => {
                converted.push(json!({ "role": msg.role.as_str(), "content": msg.content }));
            }
        }
    }
    (system, converted)
}

#[async_trait]
impl ProviderTrait for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let api_key = self.get_api_key()?;
        let model = sanitize_model(request.model.as_deref(), DEFAULT_MODEL);
        let (system, messages) = to_anthropic_messages(&request.messages);
        let max_tokens = request.max_tokens.map(|t| t.min(4096)).unwrap_or(250);

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
        });
        if let Some(sys) = system {
            body["system"] = json!(sys);
        }
        if let Some(temp) = request.temperature {
            // Anthropic accepts 0.0..=1.0
            body["temperature"] = json!(temp.clamp(0.0, 1.0));
        }

        if !self.base_url.starts_with("https://") {
            return Err(LLMError::InvalidResponse("Invalid base URL".to_string()));
        }

        tracing::debug!("Making request to Anthropic with key {}...", key_prefix(&api_key));

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response.json().await?;

        let content = json["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"].as_str() == Some("text"))
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string();

        let usage = json.get("usage").and_then(|u| {
            let input = u["input_tokens"].as_u64()?;
            let output = u["output_tokens"].as_u64()?;
            Some(Usage {
                prompt_tokens: input as u32,
                completion_tokens: output as u32,
                total_tokens: (input + output) as u32,
            })
        });

        Ok(ChatResponse {
            content,
            model: json["model"].as_str().unwrap_or(&model).to_string(),
            usage,
            finish_reason: json["stop_reason"].as_str().map(|s| s.to_string()),
        })
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}
