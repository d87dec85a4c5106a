//! Redis-backed session history.
//!
//! Each session is one list at `message_store:<session_id>`. Messages are
//! JSON documents `{"type": "human" | "ai", "data": {"content": ...}}`,
//! pushed to the head, so a full read is newest-first and gets reversed.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ChatMemory, ChatTurn, MemoryError, Speaker};

/// Key prefix shared with other clients of the same store.
pub const DEFAULT_KEY_PREFIX: &str = "message_store:";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    #[serde(rename = "type")]
    kind: Speaker,
    data: StoredData,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredData {
    content: String,
    #[serde(default)]
    additional_kwargs: Map<String, Value>,
}

fn encode(turn: &ChatTurn) -> Result<String, MemoryError> {
    let message = StoredMessage {
        kind: turn.speaker,
        data: StoredData {
            content: turn.content.clone(),
            additional_kwargs: Map::new(),
        },
    };
    Ok(serde_json::to_string(&message)?)
}

fn decode(raw: &str) -> Result<ChatTurn, MemoryError> {
    let message: StoredMessage = serde_json::from_str(raw)?;
    Ok(ChatTurn {
        speaker: message.kind,
        content: message.data.content,
    })
}

/// Turns in chronological order from a newest-first list read. Entries this
/// store cannot represent (other message types, malformed JSON) are skipped.
fn decode_history(session_id: &str, raw: &[String]) -> Vec<ChatTurn> {
    raw.iter()
        .rev()
        .filter_map(|item| match decode(item) {
            Ok(turn) => Some(turn),
            Err(e) => {
                warn!(session_id, error = %e, "skipping unreadable history entry");
                None
            }
        })
        .collect()
}

/// Session history stored in Redis lists.
#[derive(Clone)]
pub struct RedisChatMemory {
    conn: ConnectionManager,
    key_prefix: String,
    ttl_secs: Option<i64>,
}

impl RedisChatMemory {
    /// Connect to the store at `url` (e.g. `redis://localhost:13106/0`).
    pub async fn connect(url: &str) -> Result<Self, MemoryError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        debug!(url, "connected to session store");
        Ok(Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl_secs: None,
        })
    }

    /// Expire a session this many seconds after its last append.
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = Some(ttl_secs);
        self
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{session_id}", self.key_prefix)
    }
}

#[async_trait]
impl ChatMemory for RedisChatMemory {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatTurn>, MemoryError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(self.key(session_id), 0, -1).await?;
        Ok(decode_history(session_id, &raw))
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), MemoryError> {
        let key = self.key(session_id);
        let payload = encode(&turn)?;
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(&key, payload).await?;
        if let Some(ttl) = self.ttl_secs {
            let _: () = conn.expire(&key, ttl).await?;
        }
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_type_and_data_envelope() {
        let raw = encode(&ChatTurn::human("What were sales?")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "human");
        assert_eq!(value["data"]["content"], "What were sales?");
    }

    #[test]
    fn decode_reads_messages_written_by_other_clients() {
        let raw = r#"{"type": "ai", "data": {"content": "42", "additional_kwargs": {}, "example": false}}"#;
        assert_eq!(decode(raw).unwrap(), ChatTurn::ai("42"));
    }

    #[test]
    fn decode_rejects_unknown_message_type() {
        let raw = r#"{"type": "tool", "data": {"content": "x"}}"#;
        assert!(matches!(decode(raw), Err(MemoryError::Serialization(_))));
    }

    #[test]
    fn history_skips_entries_of_other_types() {
        // Newest first, as LRANGE returns them.
        let raw = vec![
            r#"{"type": "ai", "data": {"content": "Sales are up."}}"#.to_string(),
            r#"{"type": "tool", "data": {"content": "{}", "tool_call_id": "1"}}"#.to_string(),
            "not json".to_string(),
            r#"{"type": "human", "data": {"content": "How are sales?"}}"#.to_string(),
        ];
        assert_eq!(
            decode_history("s", &raw),
            vec![ChatTurn::human("How are sales?"), ChatTurn::ai("Sales are up.")]
        );
    }

    #[test]
    fn ai_turn_survives_encode_decode() {
        let turn = ChatTurn::ai("line one\nline two");
        assert_eq!(decode(&encode(&turn).unwrap()).unwrap(), turn);
    }
}
