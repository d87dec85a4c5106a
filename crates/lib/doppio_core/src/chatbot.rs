//! Request orchestration for `get_chatbot_response`.
//!
//! Strictly sequential: settings → records → reply → chart → response.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::chart::ChartRenderer;
use crate::conversation::{ConversationEngine, ConversationError};
use crate::llm::ChatModel;
use crate::memory::ChatMemory;
use crate::records::{RecordStore, fetch_records};
use crate::settings::{SettingsError, SettingsSource, resolve_settings};

/// Text placed between the reply and the chart path.
pub const GRAPH_NOTE: &str =
    "\n\nI have also created a graph based on the data. You can view it at: ";

/// Errors that fail a chatbot request.
#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("Please set `openai_api_key` in site config")]
    MissingApiKey,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

/// Everything a chatbot request depends on, injected up front.
#[derive(Clone)]
pub struct Chatbot {
    settings: Arc<dyn SettingsSource>,
    records: Arc<dyn RecordStore>,
    engine: Option<ConversationEngine>,
    charts: ChartRenderer,
}

impl Chatbot {
    /// Build a chatbot. With `llm` unset every request fails with
    /// [`ChatbotError::MissingApiKey`] before touching any store.
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        records: Arc<dyn RecordStore>,
        memory: Arc<dyn ChatMemory>,
        llm: Option<Arc<dyn ChatModel>>,
        charts: ChartRenderer,
    ) -> Self {
        Self {
            settings,
            records,
            engine: llm.map(|llm| ConversationEngine::new(llm, memory)),
            charts,
        }
    }

    /// Settings store this chatbot reads from.
    pub fn settings(&self) -> &Arc<dyn SettingsSource> {
        &self.settings
    }

    /// Answer `prompt_message` within `session_id`.
    ///
    /// Record fetch failures are not errors: the message describing them
    /// is sent to the model as data. Chart failures only drop the chart note.
    #[instrument(skip(self, prompt_message))]
    pub async fn get_chatbot_response(
        &self,
        session_id: &str,
        prompt_message: &str,
    ) -> Result<String, ChatbotError> {
        let engine = self.engine.as_ref().ok_or(ChatbotError::MissingApiKey)?;

        let settings = resolve_settings(self.settings.as_ref()).await?;
        let data = fetch_records(self.records.as_ref(), &settings.record_type).await;

        let mut response = engine
            .generate_reply(
                session_id,
                prompt_message,
                &settings.model,
                &settings.record_type,
                &data,
            )
            .await?;

        if let Some(path) = self.charts.render_chart(&settings.record_type, &data) {
            info!(path = %path.display(), "attached chart");
            response.push_str(GRAPH_NOTE);
            response.push_str(&path.to_string_lossy());
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::llm::LlmError;
    use crate::memory::in_memory::InMemoryChatMemory;
    use crate::records::Record;
    use crate::records::memory::InMemoryRecordStore;
    use crate::settings::Settings;
    use crate::settings::memory::InMemorySettings;

    /// Fixed-reply model that keeps the prompts it was sent.
    #[derive(Default)]
    struct ScriptedModel {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, model: &str, prompt: &str, _: f32) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok("Here is your summary.".to_string())
        }
    }

    struct DownModel;

    #[async_trait]
    impl ChatModel for DownModel {
        async fn complete(&self, _: &str, _: &str, _: f32) -> Result<String, LlmError> {
            Err(LlmError::Provider("connection refused".into()))
        }
    }

    fn invoices() -> Vec<Record> {
        [json!({"name": "SINV-1", "field_to_plot": 10}), json!({"name": "SINV-2", "field_to_plot": 20})]
            .into_iter()
            .map(|v: Value| v.as_object().cloned().unwrap())
            .collect()
    }

    fn settings(model: Option<&str>, doctype: Option<&str>) -> Arc<InMemorySettings> {
        Arc::new(InMemorySettings::new(Settings {
            openai_model: model.map(str::to_string),
            doctype_map: doctype.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn sales_invoice_reply_carries_chart_note() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::default());
        let bot = Chatbot::new(
            settings(None, Some("Sales Invoice")),
            Arc::new(InMemoryRecordStore::new().with_type("Sales Invoice", invoices())),
            Arc::new(InMemoryChatMemory::new()),
            Some(llm.clone() as Arc<dyn ChatModel>),
            ChartRenderer::new(dir.path()),
        );

        let response = bot
            .get_chatbot_response("session-1", "Summarize invoices")
            .await
            .unwrap();

        let chart = dir.path().join("Sales Invoice_analysis.png");
        assert_eq!(
            response,
            format!(
                "Here is your summary.\n\nI have also created a graph based on the data. You can view it at: {}",
                chart.display()
            )
        );
        assert!(chart.exists());

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "gpt-3.5-turbo");
        assert!(calls[0].1.contains("\"field_to_plot\":10"));
    }

    #[tokio::test]
    async fn missing_record_type_is_explained_to_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::default());
        let bot = Chatbot::new(
            settings(Some("gpt-4o"), Some("Ghost Type")),
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryChatMemory::new()),
            Some(llm.clone() as Arc<dyn ChatModel>),
            ChartRenderer::new(dir.path()),
        );

        let response = bot.get_chatbot_response("s", "anything?").await.unwrap();

        assert_eq!(response, "Here is your summary.");
        assert!(!response.contains("graph"));
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0, "gpt-4o");
        assert!(calls[0].1.contains("does not exist"));
        assert!(!dir.path().join("Ghost Type_analysis.png").exists());
    }

    #[tokio::test]
    async fn unset_doctype_aborts_before_any_remote_call() {
        let llm = Arc::new(ScriptedModel::default());
        let bot = Chatbot::new(
            settings(None, None),
            Arc::new(InMemoryRecordStore::failing("must not be read")),
            Arc::new(InMemoryChatMemory::new()),
            Some(llm.clone() as Arc<dyn ChatModel>),
            ChartRenderer::default(),
        );

        let err = bot.get_chatbot_response("s", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            ChatbotError::Settings(SettingsError::DoctypeNotSelected)
        ));
        assert!(llm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_aborts_first() {
        let memory = Arc::new(InMemoryChatMemory::new());
        let bot = Chatbot::new(
            settings(None, None),
            Arc::new(InMemoryRecordStore::new()),
            memory.clone(),
            None,
            ChartRenderer::default(),
        );

        let err = bot.get_chatbot_response("s", "hi").await.unwrap_err();
        assert!(matches!(err, ChatbotError::MissingApiKey));
        assert!(memory.load("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_failure_fails_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let bot = Chatbot::new(
            settings(None, Some("Sales Invoice")),
            Arc::new(InMemoryRecordStore::new().with_type("Sales Invoice", invoices())),
            Arc::new(InMemoryChatMemory::new()),
            Some(Arc::new(DownModel) as Arc<dyn ChatModel>),
            ChartRenderer::new(dir.path()),
        );

        let err = bot.get_chatbot_response("s", "hi").await.unwrap_err();
        assert!(matches!(err, ChatbotError::Conversation(_)));
        assert!(!dir.path().join("Sales Invoice_analysis.png").exists());
    }

    #[tokio::test]
    async fn records_without_plot_field_get_no_chart_note() {
        let dir = tempfile::tempdir().unwrap();
        let customers = vec![json!({"name": "CUST-1"}).as_object().cloned().unwrap()];
        let bot = Chatbot::new(
            settings(None, Some("Customer")),
            Arc::new(InMemoryRecordStore::new().with_type("Customer", customers)),
            Arc::new(InMemoryChatMemory::new()),
            Some(Arc::new(ScriptedModel::default()) as Arc<dyn ChatModel>),
            ChartRenderer::new(dir.path()),
        );

        let response = bot.get_chatbot_response("s", "hi").await.unwrap();
        assert_eq!(response, "Here is your summary.");
    }
}
