//! # doppio_api
//!
//! HTTP API library for DoppioBot.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use doppio_core::chart::ChartRenderer;
use doppio_core::chatbot::Chatbot;
use doppio_core::llm::openai::OpenAiChatModel;
use doppio_core::llm::{ChatModel, LlmError};
use doppio_core::memory::ChatMemory;
use doppio_core::records::queries::PgRecordStore;
use doppio_core::settings::queries::PgSettingsStore;

use crate::config::ApiConfig;
use crate::handlers::{chatbot, health, sessions, settings};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool, when the stores are database-backed.
    pub pool: Option<PgPool>,
    /// Request orchestrator.
    pub chatbot: Chatbot,
    /// Session history store.
    pub memory: Arc<dyn ChatMemory>,
}

impl AppState {
    /// Wire Postgres-backed stores, the configured model and chart output.
    pub fn from_config(
        config: &ApiConfig,
        pool: PgPool,
        memory: Arc<dyn ChatMemory>,
    ) -> Result<Self, LlmError> {
        let llm = config
            .openai_api_key
            .as_deref()
            .map(|key| OpenAiChatModel::with_base_url(key, config.openai_api_base.as_str()))
            .transpose()?
            .map(|model| Arc::new(model) as Arc<dyn ChatModel>);

        let chatbot = Chatbot::new(
            Arc::new(PgSettingsStore::new(pool.clone())),
            Arc::new(PgRecordStore::new(pool.clone())),
            memory.clone(),
            llm,
            ChartRenderer::new(&config.chart_dir),
        );

        Ok(Self {
            pool: Some(pool),
            chatbot,
            memory,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `doppio_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    doppio_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(
            routes::POST_API_METHOD_GET_CHATBOT_RESPONSE,
            post(chatbot::get_chatbot_response_handler),
        )
        .route(
            routes::GET_API_SETTINGS,
            get(settings::get_settings_handler).put(settings::update_settings_handler),
        )
        .route(
            routes::DELETE_API_SESSIONS_ID,
            delete(sessions::clear_session_handler),
        )
        .layer(cors)
        .with_state(state)
}
