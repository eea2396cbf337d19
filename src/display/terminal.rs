//! Terminal display surface
//!
//! Plain text is colored with `colored`; structured text is rendered with a
//! `termimad` skin. Output goes to stdout and is flushed after each call so
//! streamed fragments appear as they arrive.

use super::{DisplaySurface, StyleTag, FORMATTED_SECTION};
use colored::{ColoredString, Colorize};
use std::io::{stdout, Write};
use termimad::MadSkin;

/// Display surface writing to the terminal
pub struct TerminalSurface {
    skin: MadSkin,
    rerender_markdown: bool,
    suppressing: bool,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TerminalSurface {
    /// Creates a terminal surface
    ///
    /// When `rerender_markdown` is false, the formatted section emitted after
    /// a finished stream is swallowed (up to its closing separator) and the
    /// raw streamed text stays as the only rendering.
    pub fn new(rerender_markdown: bool) -> Self {
        Self {
            skin: MadSkin::default(),
            rerender_markdown,
            suppressing: false,
        }
    }

    fn style(text: &str, style: StyleTag) -> ColoredString {
        match style {
            StyleTag::UserTag => text.blue().bold(),
            StyleTag::UserMessage => text.normal(),
            StyleTag::AiTag => text.red().bold(),
            StyleTag::AiMessage => text.normal(),
            StyleTag::ThinkingTag => text.purple().bold(),
            StyleTag::ThinkingContent => text.bright_black(),
            StyleTag::Separator => text.bright_black(),
            StyleTag::Notice => text.cyan(),
            StyleTag::Error => text.red(),
        }
    }

    fn flush() {
        if let Err(e) = stdout().flush() {
            tracing::debug!("Failed to flush stdout: {}", e);
        }
    }
}

impl DisplaySurface for TerminalSurface {
    fn append_text(&mut self, text: &str, style: StyleTag) {
        if style == StyleTag::Separator {
            self.suppressing = false;
        } else if self.suppressing {
            return;
        }
        print!("{}", Self::style(text, style));
        Self::flush();
    }

    fn append_structured(&mut self, markup: &str, base_style: StyleTag) {
        if self.suppressing {
            return;
        }
        let rendered = self.skin.term_text(markup).to_string();
        match base_style {
            StyleTag::ThinkingContent => print!("{}", rendered.bright_black()),
            _ => print!("{}", rendered),
        }
        Self::flush();
    }

    fn begin_section(&mut self, label: &str) {
        if label == FORMATTED_SECTION {
            if !self.rerender_markdown {
                self.suppressing = true;
                return;
            }
            println!();
            println!("{}", "── formatted ──".bright_black());
        } else {
            self.suppressing = false;
            let styled = if label.starts_with('👤') {
                Self::style(label, StyleTag::UserTag)
            } else if label.starts_with('🤖') {
                Self::style(label, StyleTag::AiTag)
            } else {
                label.bold()
            };
            println!();
            println!("{}", styled);
        }
        Self::flush();
    }
}
