//! API server configuration.

/// Session store used when `redis_cache` is unset.
pub const DEFAULT_REDIS_CACHE: &str = "redis://localhost:13106/0";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL (settings and record store).
    pub pg_connection_url: String,
    /// Secret for the chat-completion API. Requests fail while unset.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_api_base: String,
    /// Session history store URL.
    pub redis_cache: String,
    /// Directory chart images are written to.
    pub chart_dir: String,
}
