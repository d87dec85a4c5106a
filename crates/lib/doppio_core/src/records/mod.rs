//! Record fetching for the configured record-type.
//!
//! Records are untyped field → value maps. Fetch failures are not raised:
//! they come back as a descriptive message on the `Err` side of
//! [`FetchedRecords`] so they can be handed to the model as ordinary data.

pub mod memory;
pub mod queries;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// One record: field name → value.
pub type Record = Map<String, Value>;

/// Records of a type, or the message describing why they could not be read.
pub type FetchedRecords = Result<Vec<Record>, String>;

/// Record store errors.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Record type not found: {0}")]
    DoesNotExist(String),

    #[error("{0}")]
    Db(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// Read access to the host's record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All fields of all records of `record_type`.
    async fn get_all(&self, record_type: &str) -> Result<Vec<Record>, RecordStoreError>;
}

/// Fetch every record of `record_type`, folding failures into a message.
pub async fn fetch_records(store: &dyn RecordStore, record_type: &str) -> FetchedRecords {
    match store.get_all(record_type).await {
        Ok(records) => {
            debug!(record_type, count = records.len(), "fetched records");
            Ok(records)
        }
        Err(RecordStoreError::DoesNotExist(_)) => {
            warn!(record_type, "record type does not exist");
            Err(format!(
                "Error: The selected Doctype '{record_type}' does not exist."
            ))
        }
        Err(e) => {
            warn!(record_type, error = %e, "record fetch failed");
            Err(format!(
                "Error while fetching data from Doctype '{record_type}': {e}"
            ))
        }
    }
}

/// JSON text of the fetched data, as embedded in the prompt.
///
/// Records serialize as a JSON array; an error message as a JSON string.
pub fn to_prompt_json(data: &FetchedRecords) -> String {
    let value = match data {
        Ok(records) => Value::Array(records.iter().cloned().map(Value::Object).collect()),
        Err(message) => Value::String(message.clone()),
    };
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::memory::InMemoryRecordStore;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn existing_type_returns_records() {
        let store = InMemoryRecordStore::new().with_type(
            "Sales Invoice",
            vec![record(json!({"name": "SINV-1", "field_to_plot": 10}))],
        );
        let data = fetch_records(&store, "Sales Invoice").await;
        let records = data.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "SINV-1");
    }

    #[tokio::test]
    async fn existing_type_without_records_is_empty_not_error() {
        let store = InMemoryRecordStore::new().with_type("Customer", Vec::new());
        assert_eq!(fetch_records(&store, "Customer").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn missing_type_becomes_message() {
        let store = InMemoryRecordStore::new();
        let err = fetch_records(&store, "Ghost Type").await.unwrap_err();
        assert_eq!(err, "Error: The selected Doctype 'Ghost Type' does not exist.");
        assert!(err.contains("does not exist"));
    }

    #[tokio::test]
    async fn generic_failure_becomes_message_with_cause() {
        let store = InMemoryRecordStore::failing("connection reset");
        let err = fetch_records(&store, "Customer").await.unwrap_err();
        assert_eq!(
            err,
            "Error while fetching data from Doctype 'Customer': connection reset"
        );
    }

    #[test]
    fn prompt_json_for_records_is_an_array() {
        let data: FetchedRecords = Ok(vec![record(json!({"a": 1}))]);
        assert_eq!(to_prompt_json(&data), r#"[{"a":1}]"#);
    }

    #[test]
    fn prompt_json_for_error_is_a_quoted_string() {
        let data: FetchedRecords = Err("Error: nope 'X'".to_string());
        assert_eq!(to_prompt_json(&data), r#""Error: nope 'X'""#);
    }
}
