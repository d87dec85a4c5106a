//! OpenAI chat-completion provider.
//!
//! Calls `{base_url}/chat/completions` once per prompt. There is no retry
//! and no client-side timeout; failures go straight back to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, LlmError};

/// Public OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChatModel {
    /// Build a client against the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Build a client against any OpenAI-compatible base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config(
                "Please set `openai_api_key` in site config".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        debug!(model, prompt_len = prompt.len(), "requesting chat completion");

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ChatRequest {
                model,
                messages: vec![ChatRequestMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature,
            })
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("OpenAI request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::Provider(format!(
                "OpenAI chat completion failed: {status} {body}"
            )));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("OpenAI response parse error: {e}")))?;

        data.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::Provider("OpenAI returned no choices".to_string()))
    }
}
