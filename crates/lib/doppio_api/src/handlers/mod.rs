//! Request handlers.

pub mod chatbot;
pub mod health;
pub mod sessions;
pub mod settings;
