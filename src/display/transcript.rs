//! Rendering of committed turns
//!
//! Streamed replies are rendered fragment by fragment by the stream
//! reconciler. Everything already complete (loaded history, non-streamed
//! replies, `history show`) goes through these helpers instead.

use super::{separator_line, DisplaySurface, StyleTag, ANSWER_MARKER, THINKING_HEADER};
use crate::conversation::{Role, Turn};

/// Section label for a user message
pub fn user_label(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => format!("👤 我 ({})", ts),
        None => "👤 我".to_string(),
    }
}

/// Section label for an assistant message
pub fn assistant_label(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => format!("🤖 DeepSeek AI ({})", ts),
        None => "🤖 DeepSeek AI".to_string(),
    }
}

/// Renders a user message
pub fn render_user(surface: &mut dyn DisplaySurface, content: &str, timestamp: Option<&str>) {
    surface.begin_section(&user_label(timestamp));
    surface.append_text(content, StyleTag::UserMessage);
    surface.append_text("\n", StyleTag::UserMessage);
}

/// Renders a complete assistant reply, closed by a separator line
pub fn render_assistant(surface: &mut dyn DisplaySurface, turn: &Turn, timestamp: Option<&str>) {
    surface.begin_section(&assistant_label(timestamp));
    if let Some(reasoning) = turn.reasoning() {
        surface.append_text(THINKING_HEADER, StyleTag::ThinkingTag);
        surface.append_structured(reasoning, StyleTag::ThinkingContent);
        surface.append_text(ANSWER_MARKER, StyleTag::AiTag);
    }
    surface.append_structured(turn.content(), StyleTag::AiMessage);
    surface.append_text(&format!("\n{}\n", separator_line()), StyleTag::Separator);
}

/// Renders a whole list of turns
pub fn render_turns(surface: &mut dyn DisplaySurface, turns: &[Turn]) {
    for turn in turns {
        match turn.role() {
            Role::User => render_user(surface, turn.content(), None),
            Role::Assistant => render_assistant(surface, turn, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingSurface;

    #[test]
    fn test_labels() {
        assert_eq!(user_label(Some("09:30:00")), "👤 我 (09:30:00)");
        assert_eq!(assistant_label(None), "🤖 DeepSeek AI");
    }

    #[test]
    fn test_render_assistant_with_reasoning() {
        let mut surface = RecordingSurface::new();
        render_assistant(
            &mut surface,
            &Turn::assistant_with_reasoning("answer", "thoughts"),
            None,
        );
        assert_eq!(
            surface.structured(),
            vec![
                ("thoughts", StyleTag::ThinkingContent),
                ("answer", StyleTag::AiMessage)
            ]
        );
        assert_eq!(surface.count_text(ANSWER_MARKER), 1);
        assert_eq!(surface.count_style(StyleTag::Separator), 1);
    }

    #[test]
    fn test_render_turns_sections() {
        let mut surface = RecordingSurface::new();
        render_turns(
            &mut surface,
            &[Turn::user("q"), Turn::assistant("a"), Turn::user("q2")],
        );
        assert_eq!(
            surface.sections(),
            vec!["👤 我", "🤖 DeepSeek AI", "👤 我"]
        );
        assert_eq!(surface.count_text(THINKING_HEADER), 0);
    }
}
