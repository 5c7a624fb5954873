//! OpenAI-compatible `/chat/completions` client

use super::{ContentImprover, SYSTEM_PROMPT, build_prompt};
use crate::config::{ImproverConfig, ProviderKind};
use crate::error::{ConfigError, ImproverError};
use crate::types::ContentContext;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion backed improver for OpenAI, DeepSeek and local servers
#[derive(Debug, Clone)]
pub struct ChatCompletionImprover {
    client: Client,
    provider: ProviderKind,
    endpoint: String,
    model: String,
    api_key_env: Option<String>,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionImprover {
    pub fn new(config: &ImproverConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url().ok_or(ConfigError::Invalid {
            field: "base_url",
            reason: "no endpoint for the selected provider".to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(format!("seolens/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "provider",
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let api_key_env = config.api_key_env().map(str::to_string);
        let api_key = api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            client,
            provider: config.provider,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: config.model().to_string(),
            api_key_env,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentImprover for ChatCompletionImprover {
    fn name(&self) -> &str {
        match self.provider {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Local => "local",
            ProviderKind::Disabled => "disabled",
        }
    }

    #[instrument(skip_all, fields(provider = self.name(), model = %self.model), level = "debug")]
    async fn enhance_for_seo(
        &self,
        html: &str,
        issues: &[String],
        context: &ContentContext,
    ) -> Result<String, ImproverError> {
        let prompt = build_prompt(html, issues, context);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        match (&self.api_key, &self.api_key_env) {
            (Some(key), _) => request = request.bearer_auth(key),
            (None, Some(env)) if self.provider != ProviderKind::Local => {
                return Err(ImproverError::MissingApiKey(env.clone()));
            }
            _ => {}
        }

        debug!(issues = issues.len(), "requesting content improvement");
        let response = request
            .send()
            .await
            .map_err(|e| ImproverError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImproverError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ImproverError::Request(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ImproverError::EmptyResponse)
    }
}
