//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Body of `POST /api/method/get_chatbot_response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotRequest {
    pub session_id: String,
    pub prompt_message: String,
}

/// RPC envelope: the reply text under `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotResponse {
    pub message: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: String,
    pub db_connected: bool,
}
