//! Postgres-backed settings store (`doppio_settings` table).

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Settings, SettingsError, SettingsSource};

/// Settings persisted in the single `doppio_settings` row.
#[derive(Debug, Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsSource for PgSettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT openai_model, doctype_map FROM doppio_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        // A missing row reads the same as a row with nothing set.
        Ok(row
            .map(|(openai_model, doctype_map)| Settings {
                openai_model,
                doctype_map,
            })
            .unwrap_or_default())
    }

    async fn update(&self, settings: &Settings) -> Result<Settings, SettingsError> {
        let (openai_model, doctype_map) = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            r#"
            INSERT INTO doppio_settings (id, openai_model, doctype_map)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE
            SET openai_model = EXCLUDED.openai_model,
                doctype_map = EXCLUDED.doctype_map,
                modified = now()
            RETURNING openai_model, doctype_map
            "#,
        )
        .bind(settings.openai_model.as_deref())
        .bind(settings.doctype_map.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(Settings {
            openai_model,
            doctype_map,
        })
    }
}
