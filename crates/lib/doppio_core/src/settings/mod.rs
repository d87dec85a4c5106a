//! DoppioBot Settings: the singleton configuration record.
//!
//! Holds the chat model identifier and the record-type the chatbot
//! analyses. Values are read on every request and never cached here.

pub mod memory;
pub mod queries;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used when `openai_model` is unset.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Please select a Doctype in the DoppioBot Settings.")]
    DoctypeNotSelected,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Stored settings, exactly as persisted. Either field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub openai_model: Option<String>,
    pub doctype_map: Option<String>,
}

/// Settings after defaults and required-field checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub model: String,
    pub record_type: String,
}

/// Read/write access to the singleton settings record.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Load the current settings.
    async fn load(&self) -> Result<Settings, SettingsError>;

    /// Replace the stored settings and return what was persisted.
    async fn update(&self, settings: &Settings) -> Result<Settings, SettingsError>;
}

/// Load settings from `source` and resolve them.
pub async fn resolve_settings(
    source: &dyn SettingsSource,
) -> Result<ResolvedSettings, SettingsError> {
    let settings = source.load().await?;
    resolve(&settings)
}

/// Apply the model default and require a record-type.
pub fn resolve(settings: &Settings) -> Result<ResolvedSettings, SettingsError> {
    let model = non_blank(settings.openai_model.as_deref())
        .unwrap_or(DEFAULT_MODEL)
        .to_string();
    let record_type = non_blank(settings.doctype_map.as_deref())
        .ok_or(SettingsError::DoctypeNotSelected)?
        .to_string();

    Ok(ResolvedSettings { model, record_type })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::memory::InMemorySettings;

    fn settings(model: Option<&str>, doctype: Option<&str>) -> Settings {
        Settings {
            openai_model: model.map(str::to_string),
            doctype_map: doctype.map(str::to_string),
        }
    }

    #[test]
    fn unset_model_falls_back_to_default() {
        let resolved = resolve(&settings(None, Some("Sales Invoice"))).unwrap();
        assert_eq!(resolved.model, DEFAULT_MODEL);
        assert_eq!(resolved.record_type, "Sales Invoice");
    }

    #[test]
    fn empty_model_falls_back_to_default() {
        let resolved = resolve(&settings(Some(""), Some("Customer"))).unwrap();
        assert_eq!(resolved.model, "gpt-3.5-turbo");
    }

    #[test]
    fn configured_model_is_kept() {
        let resolved = resolve(&settings(Some("gpt-4o"), Some("Customer"))).unwrap();
        assert_eq!(resolved.model, "gpt-4o");
    }

    #[test]
    fn missing_doctype_is_a_configuration_error() {
        let err = resolve(&settings(Some("gpt-4o"), None)).unwrap_err();
        assert!(matches!(err, SettingsError::DoctypeNotSelected));
        assert_eq!(
            err.to_string(),
            "Please select a Doctype in the DoppioBot Settings."
        );
    }

    #[test]
    fn blank_doctype_is_a_configuration_error() {
        let err = resolve(&settings(None, Some("   "))).unwrap_err();
        assert!(matches!(err, SettingsError::DoctypeNotSelected));
    }

    #[tokio::test]
    async fn resolve_settings_reads_from_source() {
        let source = InMemorySettings::new(settings(None, Some("Item")));
        let resolved = resolve_settings(&source).await.unwrap();
        assert_eq!(
            resolved,
            ResolvedSettings {
                model: DEFAULT_MODEL.to_string(),
                record_type: "Item".to_string(),
            }
        );
    }
}
