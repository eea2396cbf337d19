//! deepchat - terminal chat client
//!
#![doc = "deepchat - terminal chat client for DeepSeek"]
#![doc = "Main entry point for the deepchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deepchat::cli::{Cli, Commands};
use deepchat::commands;
use deepchat::config::Config;
use deepchat::history::HistoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { load, .. } => {
            // Model, thinking and streaming overrides were applied by Config::load
            if let Some(file) = &load {
                tracing::debug!("Starting from history file: {}", file);
            }
            commands::chat::run_chat(config, config_path, load).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            let store = HistoryStore::new(&config.history.dir)?;
            commands::history::handle_history(&store, command)?;
            Ok(())
        }
        Commands::Test => {
            tracing::info!("Starting connection test");
            commands::connection::run_test(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with streamed replies.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "deepchat=debug"
    } else {
        "deepchat=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
