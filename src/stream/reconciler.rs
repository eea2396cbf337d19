//! Reconciliation of a live response stream
//!
//! A [`StreamState`] accumulates the reasoning and answer fragments of one
//! in-flight assistant response, echoing each fragment to the display as it
//! arrives. Once the stream ends, [`StreamState::finalize`] produces the
//! [`Turn`] to commit and asks the display to re-render both buffers as
//! structured text when they look like Markdown.
//!
//! The host delivers fragments in the order received. Out-of-order input
//! (a reasoning fragment after the answer began) is accepted and appended.
//! A state that is dropped without finalizing commits nothing.

use super::markdown::looks_like_markdown;
use crate::conversation::Turn;
use crate::display::{
    separator_line, DisplaySurface, StyleTag, ANSWER_MARKER, FORMATTED_SECTION, THINKING_HEADER,
};

/// Which buffer incoming text is expected to land in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reasoning,
    Answer,
}

/// State of one streaming assistant response
#[derive(Debug, Clone)]
pub struct StreamState {
    reasoning: String,
    answer: String,
    phase: Phase,
    answer_started: bool,
    finalized: bool,
}

impl StreamState {
    /// Starts a new stream
    ///
    /// The phase starts at [`Phase::Reasoning`] when the model emits a
    /// reasoning phase, otherwise at [`Phase::Answer`].
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::stream::{Phase, StreamState};
    ///
    /// assert_eq!(StreamState::begin(true).phase(), Phase::Reasoning);
    /// assert_eq!(StreamState::begin(false).phase(), Phase::Answer);
    /// ```
    pub fn begin(supports_reasoning: bool) -> Self {
        Self {
            reasoning: String::new(),
            answer: String::new(),
            phase: if supports_reasoning {
                Phase::Reasoning
            } else {
                Phase::Answer
            },
            answer_started: false,
            finalized: false,
        }
    }

    /// Opens the assistant section on the display
    ///
    /// Prints `label` as the section header and, in the reasoning phase, the
    /// reasoning tag so fragments have somewhere to land.
    pub fn announce(&self, label: &str, surface: &mut dyn DisplaySurface) {
        surface.begin_section(label);
        if self.phase == Phase::Reasoning {
            surface.append_text(THINKING_HEADER, StyleTag::ThinkingTag);
        }
    }

    /// Appends a reasoning fragment
    pub fn ingest_reasoning(&mut self, text: &str, surface: &mut dyn DisplaySurface) {
        if text.is_empty() {
            return;
        }
        if self.phase == Phase::Answer {
            tracing::debug!(
                len = text.len(),
                "Reasoning fragment received after the answer phase began"
            );
        }
        self.reasoning.push_str(text);
        surface.append_text(text, StyleTag::ThinkingContent);
    }

    /// Appends an answer fragment
    ///
    /// The first answer fragment after non-empty reasoning emits the
    /// transition marker; the phase moves to [`Phase::Answer`] and stays there.
    pub fn ingest_answer(&mut self, text: &str, surface: &mut dyn DisplaySurface) {
        if text.is_empty() {
            return;
        }
        if !self.answer_started {
            self.answer_started = true;
            if !self.reasoning.is_empty() {
                surface.append_text(ANSWER_MARKER, StyleTag::AiTag);
            }
            self.phase = Phase::Answer;
        }
        self.answer.push_str(text);
        surface.append_text(text, StyleTag::AiMessage);
    }

    /// Builds the turn to commit and closes the display section
    ///
    /// The first call re-renders both buffers wholesale when either looks
    /// like Markdown, then appends the separator line. Later calls return an
    /// identical turn and render nothing.
    pub fn finalize(&mut self, surface: &mut dyn DisplaySurface) -> Turn {
        if !self.finalized {
            self.finalized = true;

            if self.needs_structured_render() {
                tracing::debug!("Re-rendering finished stream as structured text");
                surface.begin_section(FORMATTED_SECTION);
                if !self.reasoning.is_empty() {
                    surface.append_text(THINKING_HEADER, StyleTag::ThinkingTag);
                    surface.append_structured(&self.reasoning, StyleTag::ThinkingContent);
                    surface.append_text(ANSWER_MARKER, StyleTag::AiTag);
                }
                surface.append_structured(&self.answer, StyleTag::AiMessage);
            }

            surface.append_text(&format!("\n{}\n", separator_line()), StyleTag::Separator);
        }

        self.to_turn()
    }

    /// The turn this stream would commit right now
    pub fn to_turn(&self) -> Turn {
        Turn::assistant_with_reasoning(self.answer.clone(), self.reasoning.clone())
    }

    /// Whether either buffer would benefit from structured rendering
    pub fn needs_structured_render(&self) -> bool {
        looks_like_markdown(&self.answer) || looks_like_markdown(&self.reasoning)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
