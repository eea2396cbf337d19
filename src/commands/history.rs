use crate::cli::HistoryCommand;
use crate::conversation::Turn;
use crate::display::transcript::render_turns;
use crate::display::{DisplaySurface, TerminalSurface};
use crate::error::Result;
use crate::history::{HistoryEntry, HistoryStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Longest title shown in the history table before it is shortened
const MAX_TITLE_CHARS: usize = 40;

/// Handle history commands
pub fn handle_history(store: &HistoryStore, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List => {
            let entries = store.list()?;

            if entries.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            println!("\nConversation History ({}):", store.dir().display());
            history_table(&entries).printstd();
            println!();
            println!(
                "Use {} to continue a conversation.",
                "deepchat chat --load <FILE>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { file } => {
            let path = store.resolve(&file);
            let conversation = store.load(&path)?;
            let mut surface = TerminalSurface::default();
            show_conversation(&store.title_for(&path), conversation.turns(), &mut surface);
        }
        HistoryCommand::Delete { file } => {
            let path = store.resolve(&file);
            store.delete(&path)?;
            println!("{}", format!("Deleted {}", path.display()).green());
        }
    }

    Ok(())
}

fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Title".bold(),
        "File".bold(),
        "Modified".bold()
    ]);

    for (i, entry) in entries.iter().enumerate() {
        table.add_row(prettytable::row![
            (i + 1).to_string().cyan(),
            shorten(&entry.title),
            entry.file_name,
            entry.modified.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }
    table
}

fn show_conversation(title: &str, turns: &[Turn], surface: &mut dyn DisplaySurface) {
    surface.begin_section(title);
    render_turns(surface, turns);
}

fn shorten(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}
