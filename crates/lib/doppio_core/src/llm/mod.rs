//! Chat-completion models.
//!
//! # Providers
//!
//! - [`openai::OpenAiChatModel`]: OpenAI-compatible `/chat/completions` API

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// A remote model that turns a prompt into text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Issue one completion call for `prompt` and return the text verbatim.
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;
}
