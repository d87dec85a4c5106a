//! In-process record store, used by tests and embedded setups.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Record, RecordStore, RecordStoreError};

/// Record types and their records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    types: HashMap<String, Vec<Record>>,
    failure: Option<String>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            types: HashMap::new(),
            failure: Some(message.to_string()),
        }
    }

    /// Register `record_type` with its records.
    pub fn with_type(mut self, record_type: &str, records: Vec<Record>) -> Self {
        self.types.insert(record_type.to_string(), records);
        self
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_all(&self, record_type: &str) -> Result<Vec<Record>, RecordStoreError> {
        if let Some(msg) = &self.failure {
            return Err(RecordStoreError::Other(msg.clone()));
        }
        self.types
            .get(record_type)
            .cloned()
            .ok_or_else(|| RecordStoreError::DoesNotExist(record_type.to_string()))
    }
}
