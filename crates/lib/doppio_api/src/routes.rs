//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_API_METHOD_GET_CHATBOT_RESPONSE: &str = "/api/method/get_chatbot_response";
pub const GET_API_SETTINGS: &str = "/api/settings";
pub const DELETE_API_SESSIONS_ID: &str = "/api/sessions/{session_id}";
