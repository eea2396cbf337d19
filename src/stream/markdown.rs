//! Detection of Markdown-looking text
//!
//! Decides whether a finished response is re-rendered as structured content.

use regex::Regex;
use std::sync::OnceLock;

fn markdown_markers() -> &'static Regex {
    static MARKERS: OnceLock<Regex> = OnceLock::new();
    // `-`, `*` or `+` followed by whitespace matches mid-sentence too.
    MARKERS.get_or_init(|| Regex::new(r"(\*\*|__|`|#|>|[-*+]\s)").expect("valid regex"))
}

/// Returns true when `text` contains any Markdown marker
///
/// Markers: `**`, `__`, a backtick, `#`, `>`, or a list bullet (`-`, `*`,
/// `+` followed by whitespace), anywhere in the text.
///
/// # Examples
///
/// ```
/// use deepchat::stream::looks_like_markdown;
///
/// assert!(!looks_like_markdown("plain sentence"));
/// assert!(looks_like_markdown("- item one"));
/// ```
pub fn looks_like_markdown(text: &str) -> bool {
    markdown_markers().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_markdown() {
        assert!(!looks_like_markdown("plain sentence"));
        assert!(!looks_like_markdown(""));
        assert!(!looks_like_markdown("no markers, just commas; and dots."));
    }

    #[test]
    fn test_list_bullets_are_markdown() {
        assert!(looks_like_markdown("- item one"));
        assert!(looks_like_markdown("* item"));
        assert!(looks_like_markdown("+ item"));
    }

    #[test]
    fn test_inline_markers_are_markdown() {
        assert!(looks_like_markdown("some **bold** text"));
        assert!(looks_like_markdown("some __bold__ text"));
        assert!(looks_like_markdown("call `foo()`"));
        assert!(looks_like_markdown("# Heading"));
        assert!(looks_like_markdown("> quoted"));
    }

    #[test]
    fn test_mid_sentence_dash_is_a_false_positive() {
        assert!(looks_like_markdown("well - maybe"));
    }

    #[test]
    fn test_hyphenated_word_is_not_markdown() {
        assert!(!looks_like_markdown("well-known fact"));
    }
}
