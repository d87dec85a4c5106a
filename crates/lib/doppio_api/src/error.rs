//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use doppio_core::chatbot::ChatbotError;
use doppio_core::conversation::ConversationError;
use doppio_core::memory::MemoryError;
use doppio_core::settings::SettingsError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Configuration(m) => {
                (StatusCode::BAD_REQUEST, "configuration_error", m.as_str())
            }
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Upstream(m) => {
                error!(detail = %m, "upstream failure");
                (StatusCode::BAD_GATEWAY, "upstream_error", m.as_str())
            }
            AppError::DbUnavailable(m) => {
                error!(detail = %m, "database failure");
                (StatusCode::SERVICE_UNAVAILABLE, "db_unavailable", m.as_str())
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::DoctypeNotSelected => AppError::Configuration(e.to_string()),
            SettingsError::DbError(e) => AppError::DbUnavailable(e.to_string()),
        }
    }
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<ChatbotError> for AppError {
    fn from(e: ChatbotError) -> Self {
        match e {
            ChatbotError::MissingApiKey => AppError::Configuration(e.to_string()),
            ChatbotError::Settings(e) => AppError::from(e),
            ChatbotError::Conversation(ConversationError::Memory(e)) => AppError::from(e),
            ChatbotError::Conversation(ConversationError::Llm(e)) => {
                AppError::Upstream(e.to_string())
            }
        }
    }
}
