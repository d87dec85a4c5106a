//! # doppio_core
//!
//! Core domain logic for DoppioBot.

pub mod chart;
pub mod chatbot;
pub mod conversation;
pub mod llm;
pub mod memory;
pub mod migrate;
pub mod prompt;
pub mod records;
pub mod settings;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
