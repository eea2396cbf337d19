//! Markdown codec for exported conversations
//!
//! [`encode`] renders turns to the exported document layout and [`decode`]
//! parses that layout back. Decoding is tolerant: anything it does not
//! recognize is skipped, so hand-edited files still load.

use crate::conversation::{Conversation, ExportMode, Role, Turn};
use crate::display::{separator_line, SEPARATOR_CHAR};
use crate::error::{ChatError, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// Label of user rounds
pub const USER_LABEL: &str = "我";

/// Label of assistant rounds
pub const ASSISTANT_LABEL: &str = "DeepSeek AI";

/// Heading that opens the reasoning section of a round
pub const REASONING_HEADING: &str = "### 🧠 思考过程";

/// Heading that opens the answer section of a round carrying reasoning
pub const ANSWER_HEADING: &str = "### 💡 最终回答";

/// Timestamp format used in the export header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TITLE_PREFIX: &str = "标题:";
const EXPORTED_AT_PREFIX: &str = "导出时间:";
const MODEL_PREFIX: &str = "模型:";
const MODE_PREFIX: &str = "导出模式:";

/// Metadata written above the first round
#[derive(Debug, Clone, PartialEq)]
pub struct ExportHeader {
    pub title: String,
    pub exported_at: NaiveDateTime,
    pub model: String,
    pub mode: ExportMode,
}

/// Renders turns to the exported document layout
///
/// Output is fully determined by the arguments.
///
/// # Errors
///
/// Returns [`ChatError::NothingToExport`] when `turns` is empty.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use deepchat::conversation::{ExportMode, Turn};
/// use deepchat::history::codec::{encode, ExportHeader};
///
/// let header = ExportHeader {
///     title: "Greeting".to_string(),
///     exported_at: NaiveDate::from_ymd_opt(2024, 1, 15)
///         .unwrap()
///         .and_hms_opt(9, 30, 0)
///         .unwrap(),
///     model: "deepseek-chat".to_string(),
///     mode: ExportMode::All,
/// };
/// let text = encode(&[Turn::user("hi")], &header).unwrap();
/// assert!(text.starts_with("# Greeting\n"));
/// assert!(text.contains("## 第1轮 - 我"));
/// ```
pub fn encode(turns: &[Turn], header: &ExportHeader) -> Result<String> {
    if turns.is_empty() {
        return Err(ChatError::NothingToExport.into());
    }

    let separator = separator_line();
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", header.title));
    out.push_str(&format!("{} {}\n", TITLE_PREFIX, header.title));
    out.push_str(&format!(
        "{} {}\n",
        EXPORTED_AT_PREFIX,
        header.exported_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!("{} {}\n", MODEL_PREFIX, header.model));
    out.push_str(&format!("{} {}\n\n", MODE_PREFIX, header.mode));

    for (i, turn) in turns.iter().enumerate() {
        let label = match turn.role() {
            Role::User => USER_LABEL,
            Role::Assistant => ASSISTANT_LABEL,
        };
        out.push_str(&format!("## 第{}轮 - {}\n\n", i + 1, label));

        if let Some(reasoning) = turn.reasoning() {
            out.push_str(&format!("{}\n\n", REASONING_HEADING));
            out.push_str(&format!("{}\n\n", reasoning));
            out.push_str(&format!("{}\n\n", ANSWER_HEADING));
        }

        out.push_str(&format!("{}\n\n", turn.content()));
        out.push_str(&format!("{}\n\n", separator));
    }

    Ok(out)
}

fn round_header() -> &'static Regex {
    static ROUND: OnceLock<Regex> = OnceLock::new();
    ROUND.get_or_init(|| Regex::new(r"^##\s+第(\d+)轮\s+-\s+(.+)$").expect("valid regex"))
}

/// Classification of a single trimmed line
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    RoundHeader(&'a str),
    ReasoningStart,
    ReasoningEnd,
    Separator,
    Other,
}

fn classify(trimmed: &str) -> Line<'_> {
    if let Some(caps) = round_header().captures(trimmed) {
        if let Some(label) = caps.get(2) {
            return Line::RoundHeader(label.as_str().trim());
        }
    }
    match trimmed {
        "### 🧠 思考过程" | "### 思考过程" => Line::ReasoningStart,
        "### 💡 最终回答" | "### 最终回答" => Line::ReasoningEnd,
        "---" | "***" => Line::Separator,
        _ if !trimmed.is_empty() && trimmed.chars().all(|c| c == SEPARATOR_CHAR) => {
            Line::Separator
        }
        _ => Line::Other,
    }
}

fn role_for_label(label: &str) -> Option<Role> {
    if label == USER_LABEL {
        Some(Role::User)
    } else if label.contains("DeepSeek") || label.contains("AI") {
        Some(Role::Assistant)
    } else {
        None
    }
}

/// A round being accumulated
#[derive(Debug)]
struct Round {
    role: Role,
    content: Vec<String>,
    reasoning: Vec<String>,
    in_reasoning: bool,
}

impl Round {
    fn new(role: Role) -> Self {
        Self {
            role,
            content: Vec::new(),
            reasoning: Vec::new(),
            in_reasoning: false,
        }
    }

    fn push(&mut self, line: &str) {
        if self.in_reasoning {
            self.reasoning.push(line.to_string());
        } else {
            self.content.push(line.to_string());
        }
    }

    fn into_turn(self) -> Option<Turn> {
        let content = join_trimmed(&self.content);
        if content.is_empty() {
            tracing::debug!(role = %self.role, "Dropping round without content");
            return None;
        }
        Some(match self.role {
            Role::User => Turn::user(content),
            Role::Assistant => {
                Turn::assistant_with_reasoning(content, join_trimmed(&self.reasoning))
            }
        })
    }
}

fn join_trimmed(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// Parser state between lines
#[derive(Debug)]
enum State {
    /// Before the first round header
    Preamble,
    /// Inside a round whose label was not recognized
    Discarding,
    /// Inside a recognized round
    Round(Round),
}

/// Parses an exported document back into a conversation
///
/// Never fails: unrecognized lines are skipped, rounds with unknown labels
/// are discarded and rounds without content are dropped. An empty result
/// means nothing could be parsed.
///
/// # Examples
///
/// ```
/// use deepchat::conversation::Role;
/// use deepchat::history::codec::decode;
///
/// let conversation = decode("## 第1轮 - 我\n\nhi\n\n## 第2轮 - DeepSeek AI\n\nhello\n");
/// let turns = conversation.turns();
/// assert_eq!(turns.len(), 2);
/// assert_eq!(turns[1].role(), Role::Assistant);
/// assert_eq!(turns[1].content(), "hello");
/// ```
pub fn decode(text: &str) -> Conversation {
    let mut turns = Vec::new();
    let mut state = State::Preamble;

    for raw in text.lines() {
        let trimmed = raw.trim();
        match classify(trimmed) {
            Line::RoundHeader(label) => {
                if let State::Round(round) = state {
                    turns.extend(round.into_turn());
                }
                state = match role_for_label(label) {
                    Some(role) => State::Round(Round::new(role)),
                    None => {
                        tracing::debug!(label, "Skipping round with unrecognized label");
                        State::Discarding
                    }
                };
            }
            Line::Separator => {}
            line => {
                if let State::Round(round) = &mut state {
                    match line {
                        Line::ReasoningStart => round.in_reasoning = true,
                        Line::ReasoningEnd => round.in_reasoning = false,
                        _ => round.push(raw),
                    }
                }
            }
        }
    }

    if let State::Round(round) = state {
        turns.extend(round.into_turn());
    }

    tracing::debug!(turns = turns.len(), "Decoded conversation");
    Conversation::from(turns)
}
