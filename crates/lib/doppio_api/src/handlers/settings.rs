//! DoppioBot Settings handlers.

use axum::Json;
use axum::extract::State;
use tracing::info;

use doppio_core::settings::{Settings, SettingsSource};

use crate::AppState;
use crate::error::AppResult;

/// `GET /api/settings`: the stored settings, unresolved.
pub async fn get_settings_handler(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    let settings = state.chatbot.settings().load().await?;
    Ok(Json(settings))
}

/// `PUT /api/settings`: replace both settings fields.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(body): Json<Settings>,
) -> AppResult<Json<Settings>> {
    let saved = state.chatbot.settings().update(&body).await?;
    info!(
        openai_model = ?saved.openai_model,
        doctype_map = ?saved.doctype_map,
        "settings updated"
    );
    Ok(Json(saved))
}
