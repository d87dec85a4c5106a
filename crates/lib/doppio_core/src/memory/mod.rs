//! Session-scoped conversation memory.
//!
//! A session's history is owned by an external store; this module only
//! loads it, appends to it, and renders it as a buffer for the prompt.

pub mod in_memory;
pub mod redis_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory store errors.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Session store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed session message: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Human,
    Ai,
    System,
}

impl Speaker {
    /// Prefix used when rendering the history buffer.
    pub fn prefix(&self) -> &'static str {
        match self {
            Speaker::Human => "Human",
            Speaker::Ai => "AI",
            Speaker::System => "System",
        }
    }
}

/// One message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub content: String,
}

impl ChatTurn {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            content: content.into(),
        }
    }
}

/// Capability interface over a session history store.
#[async_trait]
pub trait ChatMemory: Send + Sync {
    /// History of `session_id`, oldest first. Unknown sessions are empty.
    async fn load(&self, session_id: &str) -> Result<Vec<ChatTurn>, MemoryError>;

    /// Append one turn to the end of `session_id`'s history.
    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), MemoryError>;

    /// Drop the whole history of `session_id`.
    async fn clear(&self, session_id: &str) -> Result<(), MemoryError>;
}

/// Render history as `Human: ...` / `AI: ...` lines.
pub fn buffer_string(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.prefix(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_string_of_empty_history_is_empty() {
        assert_eq!(buffer_string(&[]), "");
    }

    #[test]
    fn buffer_string_prefixes_each_turn() {
        let history = vec![
            ChatTurn::human("hi"),
            ChatTurn::ai("hello!"),
            ChatTurn {
                speaker: Speaker::System,
                content: "summary".into(),
            },
        ];
        assert_eq!(
            buffer_string(&history),
            "Human: hi\nAI: hello!\nSystem: summary"
        );
    }
}
