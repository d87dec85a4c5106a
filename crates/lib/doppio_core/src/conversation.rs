//! Conversation engine: one memory-backed completion per user message.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{ChatModel, LlmError};
use crate::memory::{ChatMemory, ChatTurn, MemoryError, buffer_string};
use crate::prompt::{self, PromptInputs};
use crate::records::{FetchedRecords, to_prompt_json};

/// Sampling temperature for every completion.
pub const TEMPERATURE: f32 = 0.0;

/// Failures of the remote model or the session store.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Chat model plus session memory.
#[derive(Clone)]
pub struct ConversationEngine {
    llm: Arc<dyn ChatModel>,
    memory: Arc<dyn ChatMemory>,
}

impl ConversationEngine {
    pub fn new(llm: Arc<dyn ChatModel>, memory: Arc<dyn ChatMemory>) -> Self {
        Self { llm, memory }
    }

    /// Answer `user_message` in `session_id` with `records` as context.
    ///
    /// The session's history is rendered into the prompt, and the new
    /// exchange is appended once the model has replied. Nothing is
    /// retried or caught here.
    pub async fn generate_reply(
        &self,
        session_id: &str,
        user_message: &str,
        model: &str,
        record_type: &str,
        records: &FetchedRecords,
    ) -> Result<String, ConversationError> {
        let history = self.memory.load(session_id).await?;
        let history_buffer = buffer_string(&history);
        let doctype_data = to_prompt_json(records);

        let prompt = prompt::render(&PromptInputs {
            history: &history_buffer,
            input: user_message,
            doctype_data: &doctype_data,
        });
        debug!(
            session_id,
            record_type,
            history_turns = history.len(),
            "rendered prompt"
        );

        let reply = self.llm.complete(model, &prompt, TEMPERATURE).await?;

        self.memory
            .append(session_id, ChatTurn::human(user_message))
            .await?;
        self.memory
            .append(session_id, ChatTurn::ai(reply.clone()))
            .await?;

        info!(session_id, model, reply_len = reply.len(), "generated reply");
        Ok(reply)
    }
}
