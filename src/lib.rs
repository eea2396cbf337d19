//! deepchat - terminal chat client library
//!
//! This library provides the pieces behind the `deepchat` CLI: streaming
//! chat against DeepSeek's OpenAI-compatible API, live reconciliation of
//! reasoning and answer text, and a Markdown history format that round-trips
//! conversations to disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Turns, conversation pairs and export selection
//! - `stream`: Reconciles a live response stream into a committed turn
//! - `display`: Write-only display surface contract and implementations
//! - `history`: Markdown codec, title extraction and the history directory
//! - `providers`: Chat completion provider abstraction and the HTTP client
//! - `commands`: CLI command handlers and the interactive session
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use deepchat::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     deepchat::commands::chat::run_chat(config, "config/config.yaml", None).await
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod display;
pub mod error;
pub mod history;
pub mod providers;
pub mod stream;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{Conversation, Role, Turn};
pub use error::{ChatError, Result};
pub use stream::StreamState;

#[cfg(test)]
pub mod test_utils;
