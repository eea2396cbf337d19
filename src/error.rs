//! Error types for deepchat
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for deepchat operations
///
/// Covers configuration loading, provider interaction, history export and
/// import, and interactive command handling.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Export was requested for an empty conversation
    #[error("Nothing to export: the conversation is empty")]
    NothingToExport,

    /// A history file was read but produced no turns
    #[error("No content parsed from history file: {0}")]
    NoContentParsed(String),

    /// Writing an exported conversation failed
    #[error("Export failed: {0}")]
    Export(String),

    /// History directory errors (missing file, unreadable directory)
    #[error("History error: {0}")]
    History(String),

    /// Invalid interactive command usage
    #[error("Command error: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for deepchat operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`ChatError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;
