//! Special commands parser for interactive chat mode
//!
//! Special commands manage the session instead of being sent to the model:
//! selecting and deleting conversation pairs, exporting and loading history,
//! toggling the reasoning phase, and switching models.
//!
//! Commands are prefixed with `/`; the command word is case-insensitive while
//! arguments such as titles and file names keep their case. Pair numbers are
//! 1-based as shown by `/pairs`.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// How a loaded conversation joins the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Keep the current turns and add the loaded ones after them
    #[default]
    Append,
    /// Discard the current turns
    Replace,
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,

    /// Show model, reasoning, stream and selection state
    ShowStatus,

    /// List conversation pairs with their selection marks
    ListPairs,

    /// Mark pairs (0-based) for export
    Select(Vec<usize>),

    /// Unmark pairs (0-based)
    Unselect(Vec<usize>),

    /// Drop the whole selection
    ClearSelection,

    /// Delete one pair (0-based) from the session
    DeletePair(usize),

    /// Export the selection, or everything when nothing is selected
    Export { title: Option<String> },

    /// Load a stored conversation into the session
    Load { file: String, mode: LoadMode },

    /// List stored conversations
    History,

    /// Start over with an empty conversation
    Clear,

    /// Turn the reasoning phase on or off
    Thinking(bool),

    /// Switch to a different model
    SwitchModel(String),

    /// Persist the current settings to the config file
    SaveConfig,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a regular message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use deepchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/select 1 3").unwrap(), SpecialCommand::Select(vec![0, 2]));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (word, args) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match (word.as_str(), args) {
        ("/help" | "/?", "") => Ok(SpecialCommand::Help),
        ("/status", "") => Ok(SpecialCommand::ShowStatus),
        ("/pairs", "") => Ok(SpecialCommand::ListPairs),
        ("/history", "") => Ok(SpecialCommand::History),
        ("/clear", "") => Ok(SpecialCommand::Clear),
        ("/save", "") => Ok(SpecialCommand::SaveConfig),

        ("/select", "") => Err(CommandError::MissingArgument {
            command: "/select".to_string(),
            usage: "/select <n>... | /select none".to_string(),
        }),
        ("/select", a) if a.eq_ignore_ascii_case("none") => Ok(SpecialCommand::ClearSelection),
        ("/select", a) => parse_pair_numbers("/select", a).map(SpecialCommand::Select),

        ("/unselect", "") => Err(CommandError::MissingArgument {
            command: "/unselect".to_string(),
            usage: "/unselect <n>...".to_string(),
        }),
        ("/unselect", a) => parse_pair_numbers("/unselect", a).map(SpecialCommand::Unselect),

        ("/delete", "") => Err(CommandError::MissingArgument {
            command: "/delete".to_string(),
            usage: "/delete <n>".to_string(),
        }),
        ("/delete", a) => match parse_pair_numbers("/delete", a)?.as_slice() {
            [single] => Ok(SpecialCommand::DeletePair(*single)),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/delete".to_string(),
                arg: a.to_string(),
            }),
        },

        ("/export", "") => Ok(SpecialCommand::Export { title: None }),
        ("/export", a) => Ok(SpecialCommand::Export {
            title: Some(a.to_string()),
        }),

        ("/load", "") => Err(CommandError::MissingArgument {
            command: "/load".to_string(),
            usage: "/load <file> [append|replace]".to_string(),
        }),
        ("/load", a) => parse_load(a),

        ("/thinking", a) if a.eq_ignore_ascii_case("on") => Ok(SpecialCommand::Thinking(true)),
        ("/thinking", a) if a.eq_ignore_ascii_case("off") => Ok(SpecialCommand::Thinking(false)),
        ("/thinking", "") => Err(CommandError::MissingArgument {
            command: "/thinking".to_string(),
            usage: "/thinking <on|off>".to_string(),
        }),
        ("/thinking", a) => Err(CommandError::UnsupportedArgument {
            command: "/thinking".to_string(),
            arg: a.to_string(),
        }),

        ("/model", "") => Err(CommandError::MissingArgument {
            command: "/model".to_string(),
            usage: "/model <name>".to_string(),
        }),
        ("/model", a) => Ok(SpecialCommand::SwitchModel(a.to_string())),

        // Exit commands
        ("exit" | "quit" | "/exit" | "/quit", "") => Ok(SpecialCommand::Exit),

        // Known commands that take no arguments
        (
            "/help" | "/?" | "/status" | "/pairs" | "/history" | "/clear" | "/save" | "/exit"
            | "/quit",
            a,
        ) => Err(CommandError::UnsupportedArgument {
            command: word.clone(),
            arg: a.to_string(),
        }),

        // Unknown command starting with "/"
        (w, _) if w.starts_with('/') => Err(CommandError::UnknownCommand(w.to_string())),

        // "exit now" and similar are ordinary messages
        _ => Ok(SpecialCommand::None),
    }
}

/// Parses 1-based pair numbers into 0-based indices
fn parse_pair_numbers(command: &str, args: &str) -> Result<Vec<usize>, CommandError> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n - 1),
            _ => Err(CommandError::UnsupportedArgument {
                command: command.to_string(),
                arg: s.to_string(),
            }),
        })
        .collect()
}

fn parse_load(args: &str) -> Result<SpecialCommand, CommandError> {
    let (file, mode) = match args.rsplit_once(char::is_whitespace) {
        Some((file, m)) if m.eq_ignore_ascii_case("append") => (file.trim(), LoadMode::Append),
        Some((file, m)) if m.eq_ignore_ascii_case("replace") => (file.trim(), LoadMode::Replace),
        _ => (args, LoadMode::default()),
    };
    Ok(SpecialCommand::Load {
        file: file.to_string(),
        mode,
    })
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CONVERSATION:
  /pairs            - List conversation pairs (* marks selected ones)
  /select <n>...    - Select pairs for export (e.g. /select 1 3)
  /select none      - Clear the selection
  /unselect <n>...  - Remove pairs from the selection
  /delete <n>       - Delete a pair from the session
  /clear            - Start a new, empty conversation

HISTORY:
  /export [title]   - Export the selection (or everything) to Markdown
  /load <file> [append|replace]
                    - Load a stored conversation (default: append)
  /history          - List stored conversations

MODEL:
  /model <name>     - Switch model (deepseek-chat, deepseek-reasoner)
  /thinking on|off  - Request or stop a visible reasoning phase
  /save             - Save model and reasoning settings to the config file

SESSION:
  /status           - Show model, reasoning and selection state
  /help             - Show this help message
  exit              - Exit interactive mode
  quit              - Same as exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - Without a title, /export asks the model to suggest one
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(
            parse_special_command("/pairs").unwrap(),
            SpecialCommand::ListPairs
        );
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::History
        );
        assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::Clear);
        assert_eq!(
            parse_special_command("/SAVE").unwrap(),
            SpecialCommand::SaveConfig
        );
    }

    #[test]
    fn test_parse_exit_variants() {
        for input in ["exit", "quit", "/exit", "/quit", "EXIT", "  quit  "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_parse_regular_text_returns_none() {
        assert_eq!(
            parse_special_command("hello there").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
        assert_eq!(parse_special_command("   ").unwrap(), SpecialCommand::None);
        assert_eq!(
            parse_special_command("exit now please").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_case_insensitive_command_word() {
        assert_eq!(parse_special_command("/HELP").unwrap(), SpecialCommand::Help);
        assert_eq!(
            parse_special_command("/Select NONE").unwrap(),
            SpecialCommand::ClearSelection
        );
    }

    #[test]
    fn test_parse_select_is_one_based() {
        assert_eq!(
            parse_special_command("/select 1 3").unwrap(),
            SpecialCommand::Select(vec![0, 2])
        );
        assert_eq!(
            parse_special_command("/select 2,4").unwrap(),
            SpecialCommand::Select(vec![1, 3])
        );
        assert_eq!(
            parse_special_command("/unselect 2").unwrap(),
            SpecialCommand::Unselect(vec![1])
        );
    }

    #[test]
    fn test_parse_select_rejects_zero_and_words() {
        let result = parse_special_command("/select 0");
        assert_eq!(
            result,
            Err(CommandError::UnsupportedArgument {
                command: "/select".to_string(),
                arg: "0".to_string(),
            })
        );
        assert!(parse_special_command("/select one").is_err());
    }

    #[test]
    fn test_parse_select_without_argument() {
        if let Err(CommandError::MissingArgument { command, usage }) =
            parse_special_command("/select")
        {
            assert_eq!(command, "/select");
            assert!(usage.contains("none"));
        } else {
            panic!("Expected MissingArgument error");
        }
    }

    #[test]
    fn test_parse_delete_single_pair_only() {
        assert_eq!(
            parse_special_command("/delete 2").unwrap(),
            SpecialCommand::DeletePair(1)
        );
        assert!(parse_special_command("/delete 1 2").is_err());
        assert!(parse_special_command("/delete").is_err());
    }

    #[test]
    fn test_parse_export_keeps_title_case() {
        assert_eq!(
            parse_special_command("/export").unwrap(),
            SpecialCommand::Export { title: None }
        );
        assert_eq!(
            parse_special_command("/EXPORT  Rust Ownership Notes ").unwrap(),
            SpecialCommand::Export {
                title: Some("Rust Ownership Notes".to_string())
            }
        );
    }

    #[test]
    fn test_parse_load_modes() {
        assert_eq!(
            parse_special_command("/load Chat.md").unwrap(),
            SpecialCommand::Load {
                file: "Chat.md".to_string(),
                mode: LoadMode::Append
            }
        );
        assert_eq!(
            parse_special_command("/load old chat.md REPLACE").unwrap(),
            SpecialCommand::Load {
                file: "old chat.md".to_string(),
                mode: LoadMode::Replace
            }
        );
        assert_eq!(
            parse_special_command("/load a.md append").unwrap(),
            SpecialCommand::Load {
                file: "a.md".to_string(),
                mode: LoadMode::Append
            }
        );
    }

    #[test]
    fn test_parse_thinking() {
        assert_eq!(
            parse_special_command("/thinking on").unwrap(),
            SpecialCommand::Thinking(true)
        );
        assert_eq!(
            parse_special_command("/THINKING OFF").unwrap(),
            SpecialCommand::Thinking(false)
        );
        if let Err(CommandError::UnsupportedArgument { command, arg }) =
            parse_special_command("/thinking maybe")
        {
            assert_eq!(command, "/thinking");
            assert_eq!(arg, "maybe");
        } else {
            panic!("Expected UnsupportedArgument error");
        }
    }

    #[test]
    fn test_parse_switch_model() {
        assert_eq!(
            parse_special_command("/model deepseek-reasoner").unwrap(),
            SpecialCommand::SwitchModel("deepseek-reasoner".to_string())
        );
        assert!(matches!(
            parse_special_command("/model"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_unknown_command_returns_error() {
        if let Err(CommandError::UnknownCommand(cmd)) = parse_special_command("/frobnicate now") {
            assert_eq!(cmd, "/frobnicate");
        } else {
            panic!("Expected UnknownCommand error");
        }
    }

    #[test]
    fn test_parse_argument_to_bare_command_is_error() {
        assert!(matches!(
            parse_special_command("/status verbose"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }
}
