//! Session history handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use doppio_core::memory::ChatMemory;

use crate::AppState;
use crate::error::AppResult;

/// `DELETE /api/sessions/{session_id}`: forget a session's history.
pub async fn clear_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    state.memory.clear(&session_id).await?;
    info!(session_id = %session_id, "session history cleared");
    Ok(StatusCode::NO_CONTENT)
}
