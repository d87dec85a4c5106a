//! Postgres-backed record store (`record_types` / `records` tables).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use super::{Record, RecordStore, RecordStoreError};

/// Row returned by record queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordRow {
    pub name: String,
    pub data: Value,
    pub creation: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl RecordRow {
    /// Flatten into one map: the stored document plus the standard fields.
    pub fn into_record(self) -> Record {
        let mut record = match self.data {
            Value::Object(map) => map,
            _ => Record::new(),
        };
        record.insert("name".into(), Value::String(self.name));
        record.insert("creation".into(), Value::String(self.creation.to_rfc3339()));
        record.insert("modified".into(), Value::String(self.modified.to_rfc3339()));
        record
    }
}

/// Records read straight from Postgres.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_all(&self, record_type: &str) -> Result<Vec<Record>, RecordStoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM record_types WHERE name = $1)",
        )
        .bind(record_type)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(RecordStoreError::DoesNotExist(record_type.to_string()));
        }

        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT name, data, creation, modified
            FROM records
            WHERE record_type = $1
            ORDER BY modified DESC
            "#,
        )
        .bind(record_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RecordRow::into_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn into_record_merges_standard_fields() {
        let ts = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let row = RecordRow {
            name: "SINV-0001".into(),
            data: json!({"customer": "ACME", "field_to_plot": 12.5, "name": "stale"}),
            creation: ts,
            modified: ts,
        };
        let record = row.into_record();
        assert_eq!(record["name"], "SINV-0001");
        assert_eq!(record["customer"], "ACME");
        assert_eq!(record["field_to_plot"], 12.5);
        assert_eq!(record["creation"], "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn into_record_ignores_non_object_data() {
        let ts = Utc::now();
        let row = RecordRow {
            name: "X".into(),
            data: json!([1, 2, 3]),
            creation: ts,
            modified: ts,
        };
        let record = row.into_record();
        assert_eq!(record.len(), 3);
        assert_eq!(record["name"], "X");
    }
}
