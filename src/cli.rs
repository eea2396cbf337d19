//! Command-line interface definition for deepchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, history management, and
//! connection testing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deepchat - terminal client for DeepSeek and other OpenAI-compatible APIs
///
/// Chat with streamed reasoning and answers, export conversations to
/// Markdown, and load them back later.
#[derive(Parser, Debug, Clone)]
#[command(name = "deepchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding exported conversations (overrides config)
    #[arg(long)]
    pub history_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for deepchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the model from config (deepseek-chat, deepseek-reasoner)
        #[arg(short, long)]
        model: Option<String>,

        /// Request a visible reasoning phase
        #[arg(short, long)]
        thinking: bool,

        /// Wait for complete replies instead of streaming them
        #[arg(long)]
        no_stream: bool,

        /// Start from a previously exported conversation
        #[arg(short, long)]
        load: Option<String>,
    },

    /// Manage exported conversations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Check that the configured API answers
    Test,
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored conversations, newest first
    List,

    /// Print a stored conversation
    Show {
        /// File name (inside the history directory) or path
        file: String,
    },

    /// Delete a stored conversation
    Delete {
        /// File name (inside the history directory) or path
        file: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            history_dir: None,
            command: Commands::Chat {
                model: None,
                thinking: false,
                no_stream: false,
                load: None,
            },
        }
    }
}
