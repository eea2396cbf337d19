//! In-memory display surface that records every call
//!
//! Used by tests and by hosts that want to inspect what would have been
//! rendered (for example to count separators).

use super::{DisplaySurface, StyleTag};

/// One call made against a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Text { text: String, style: StyleTag },
    Structured { markup: String, style: StyleTag },
    Section(String),
}

/// Surface that keeps an ordered log of render commands
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<RecordedCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Number of plain-text calls whose text equals `text` exactly
    pub fn count_text(&self, text: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Text { text: t, .. } if t == text))
            .count()
    }

    /// Number of calls made with the given style
    pub fn count_style(&self, style: StyleTag) -> usize {
        self.calls
            .iter()
            .filter(|c| match c {
                RecordedCall::Text { style: s, .. } | RecordedCall::Structured { style: s, .. } => {
                    *s == style
                }
                RecordedCall::Section(_) => false,
            })
            .count()
    }

    /// Labels of all sections begun so far
    pub fn sections(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Section(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Markup passed to structured rendering, in order
    pub fn structured(&self) -> Vec<(&str, StyleTag)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Structured { markup, style } => Some((markup.as_str(), *style)),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of everything rendered, plain and structured
    pub fn transcript(&self) -> String {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Text { text, .. } => Some(text.as_str()),
                RecordedCall::Structured { markup, .. } => Some(markup.as_str()),
                RecordedCall::Section(_) => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingSurface {
    fn append_text(&mut self, text: &str, style: StyleTag) {
        self.calls.push(RecordedCall::Text {
            text: text.to_string(),
            style,
        });
    }

    fn append_structured(&mut self, markup: &str, base_style: StyleTag) {
        self.calls.push(RecordedCall::Structured {
            markup: markup.to_string(),
            style: base_style,
        });
    }

    fn begin_section(&mut self, label: &str) {
        self.calls.push(RecordedCall::Section(label.to_string()));
    }
}
