//! Chatbot request handler.

use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ChatbotRequest, ChatbotResponse};

/// `POST /api/method/get_chatbot_response`: answer one user message.
pub async fn get_chatbot_response_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatbotRequest>,
) -> AppResult<Json<ChatbotResponse>> {
    if body.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id is required".into()));
    }

    info!(session_id = %body.session_id, "chatbot request");
    let message = state
        .chatbot
        .get_chatbot_response(&body.session_id, &body.prompt_message)
        .await?;

    Ok(Json(ChatbotResponse { message }))
}
