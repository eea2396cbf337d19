/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: Interactive chat session
- `history`: List, show and delete exported conversations
- `connection`: One-shot connection test against the configured API

The handlers stay small and delegate to the library components:
providers, the stream reconciler, and the history store.
*/

use crate::commands::special_commands::{parse_special_command, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::providers::OpenAiProvider;

// Special commands parser for the chat REPL
pub mod special_commands;

// Session state behind the chat REPL
pub mod session;

// History management commands
pub mod history;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates the provider and history store, then runs a readline-based
    //! loop that either executes special commands or sends the input to the
    //! model through a [`ChatSession`].

    use super::*;
    use crate::commands::session::{ChatSession, CommandOutcome};
    use crate::commands::special_commands::LoadMode;
    use crate::display::{DisplaySurface, StyleTag, TerminalSurface};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `config_path` - File written by `/save`
    /// * `load` - Optional history file to start from
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::commands::chat;
    /// use deepchat::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), "config/config.yaml", None).await?;
    /// ```
    pub async fn run_chat(config: Config, config_path: &str, load: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let provider = OpenAiProvider::new(&config.provider)?;
        let store = HistoryStore::new(&config.history.dir)?;
        let mut surface = TerminalSurface::new(config.display.rerender_markdown);
        let mut session =
            ChatSession::new(config, Box::new(provider), store).with_config_path(config_path);

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&session);

        if let Some(file) = load {
            let outcome = session
                .handle_command(
                    SpecialCommand::Load {
                        file,
                        mode: LoadMode::Replace,
                    },
                    &mut surface,
                )
                .await;
            if let Err(e) = outcome {
                report_error(&mut surface, &e);
            }
        }

        loop {
            let prompt = format_prompt(&session);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;

                    // Check for special commands first
                    let command = match parse_special_command(trimmed) {
                        Ok(cmd) => cmd,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    if command != SpecialCommand::None {
                        match session.handle_command(command, &mut surface).await {
                            Ok(CommandOutcome::Exit) => break,
                            Ok(CommandOutcome::Continue) => {}
                            Err(e) => report_error(&mut surface, &e),
                        }
                        continue;
                    }

                    // Dropping the in-flight request abandons its stream
                    let result = tokio::select! {
                        result = session.send_message(trimmed, &mut surface) => Some(result),
                        _ = tokio::signal::ctrl_c() => None,
                    };
                    match result {
                        Some(Ok(())) => {}
                        Some(Err(e)) => report_error(&mut surface, &e),
                        None => {
                            tracing::info!("Response interrupted by user");
                            surface.append_text("\n⏹ 已中断\n", StyleTag::Notice);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn report_error(surface: &mut dyn DisplaySurface, error: &anyhow::Error) {
        tracing::debug!("Command failed: {:?}", error);
        surface.append_text(&format!("\n❌ {}\n", error), StyleTag::Error);
    }

    fn format_prompt(session: &ChatSession) -> String {
        let tag = if session.config().reasoning_active() {
            format!("[{} 🧠]", session.config().provider.model)
        } else {
            format!("[{}]", session.config().provider.model)
        };
        format!("{} >> ", tag.cyan())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(session: &ChatSession) {
        let config = session.config();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              DeepChat Interactive Session                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:    {}", config.provider.model.cyan());
        println!(
            "Thinking: {}",
            if config.reasoning_active() {
                "on".green()
            } else {
                "off".yellow()
            }
        );
        println!(
            "History:  {}\n",
            config.history.dir.display().to_string().bright_black()
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

// Connection test command handler
pub mod connection {
    //! Connection test.
    //!
    //! Sends a tiny prompt with the configured model and reports the reply.

    use super::*;
    use crate::providers::ChatProvider;
    use colored::Colorize;

    /// Run the connection test
    ///
    /// # Errors
    ///
    /// Returns the provider error when the API cannot be reached or rejects
    /// the request
    pub async fn run_test(config: Config) -> Result<()> {
        let provider = OpenAiProvider::new(&config.provider)?;
        println!(
            "Testing connection to {} with {}...",
            provider.endpoint().cyan(),
            config.provider.model.cyan()
        );
        check_connection(&provider, &config.provider.model).await
    }

    /// Runs the test against any provider and prints the outcome
    pub async fn check_connection(provider: &dyn ChatProvider, model: &str) -> Result<()> {
        match provider.test_connection(model).await {
            Ok(reply) => {
                println!("{}", "✅ API 连接成功".green());
                println!("Reply: {}", reply.trim());
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", format!("❌ API 连接失败: {}", e).red());
                Err(e)
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::ScriptedProvider;

        #[tokio::test]
        async fn test_check_connection_uses_model() {
            let provider = ScriptedProvider::completing("连接成功", None);
            let requests = provider.requests();
            check_connection(&provider, "deepseek-reasoner").await.unwrap();

            let requests = requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].model, "deepseek-reasoner");
        }
    }
}
