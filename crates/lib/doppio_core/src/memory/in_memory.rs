//! Process-local session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ChatMemory, ChatTurn, MemoryError};

/// Session histories kept in a map; lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryChatMemory {
    sessions: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl InMemoryChatMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatMemory for InMemoryChatMemory {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatTurn>, MemoryError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), MemoryError> {
        self.sessions
            .lock()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        self.sessions.lock().await.remove(session_id);
        Ok(())
    }
}
