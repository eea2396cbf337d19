//! Display surface contract
//!
//! The stream reconciler and the history commands never talk to a terminal
//! directly. They push render commands into a [`DisplaySurface`], which is a
//! write-only presentation sink. Nothing is ever read back from it.

pub mod recording;
pub mod terminal;
pub mod transcript;

pub use recording::{RecordedCall, RecordingSurface};
pub use terminal::TerminalSurface;

/// Length of the separator line drawn after every assistant reply
pub const SEPARATOR_LENGTH: usize = 50;

/// Character used for separator lines
pub const SEPARATOR_CHAR: char = '─';

/// Label of the section that carries the structured re-render of a finished stream
pub const FORMATTED_SECTION: &str = "formatted";

/// Tag printed before reasoning text
pub const THINKING_HEADER: &str = "🧠 思考过程:\n";

/// Marker printed between reasoning and answer
pub const ANSWER_MARKER: &str = "\n\n💡 最终回答:\n";

/// Returns the fixed-length separator line (without newlines)
///
/// # Examples
///
/// ```
/// use deepchat::display::{separator_line, SEPARATOR_LENGTH};
///
/// assert_eq!(separator_line().chars().count(), SEPARATOR_LENGTH);
/// ```
pub fn separator_line() -> String {
    std::iter::repeat(SEPARATOR_CHAR)
        .take(SEPARATOR_LENGTH)
        .collect()
}

/// Presentation style of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    /// Header line of a user message
    UserTag,
    /// Body of a user message
    UserMessage,
    /// Header line of an assistant message and the answer marker
    AiTag,
    /// Body of an assistant answer
    AiMessage,
    /// Reasoning header
    ThinkingTag,
    /// Reasoning body
    ThinkingContent,
    /// Separator lines
    Separator,
    /// Informational notices from the host
    Notice,
    /// Errors reported to the user
    Error,
}

/// Write-only sink for render commands
pub trait DisplaySurface {
    /// Appends plain text with a style
    fn append_text(&mut self, text: &str, style: StyleTag);

    /// Appends Markdown text, rendered as structured content on top of `base_style`
    fn append_structured(&mut self, markup: &str, base_style: StyleTag);

    /// Starts a new labelled section
    fn begin_section(&mut self, label: &str);
}
