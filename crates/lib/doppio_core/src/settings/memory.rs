//! In-process settings store, used by tests and embedded setups.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Settings, SettingsError, SettingsSource};

/// Settings held in memory behind a lock.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    inner: RwLock<Settings>,
}

impl InMemorySettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsSource for InMemorySettings {
    async fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.inner.read().await.clone())
    }

    async fn update(&self, settings: &Settings) -> Result<Settings, SettingsError> {
        let mut guard = self.inner.write().await;
        *guard = settings.clone();
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_replaces_both_fields() {
        let store = InMemorySettings::default();
        assert_eq!(store.load().await.unwrap(), Settings::default());

        let next = Settings {
            openai_model: Some("gpt-4o-mini".into()),
            doctype_map: Some("Customer".into()),
        };
        let saved = store.update(&next).await.unwrap();
        assert_eq!(saved, next);
        assert_eq!(store.load().await.unwrap(), next);
    }
}
