//! Prompt building and cleanup for AI-generated export titles

use crate::conversation::{ApiMessage, Role, Turn};

/// Upper bound on the conversation text sent for title generation
pub const MAX_TITLE_GEN_LENGTH: usize = 3000;

/// Per-reply cap on assistant text included in the prompt
pub const MAX_CONTENT_PREVIEW: usize = 500;

/// Maximum title length requested from the model, in characters
pub const TITLE_MAX_LENGTH: usize = 9;

/// Title used when none is given and none could be generated
pub const FALLBACK_TITLE: &str = "DeepSeek AI 对话记录";

const TRUNCATION_NOTE: &str = "...（对话内容较长，已截取部分）";

const GENERIC_TITLES: &[&str] = &["deepseek ai 对话记录", "对话记录", "chat history"];

/// System prompt asking the model for a short title
pub fn title_system_prompt() -> String {
    format!(
        "请根据以下对话内容，生成一个简洁的标题（不超过{}个字）。标题应该概括对话的主要主题或内容。只返回标题，不要其他内容，不要加引号。",
        TITLE_MAX_LENGTH
    )
}

/// Condenses turns into the text the title prompt summarizes
///
/// User turns are prefixed `用户: `, assistant turns `AI: ` with their answer
/// capped at [`MAX_CONTENT_PREVIEW`] characters. Reasoning is never included.
/// Collection stops before the total would exceed `max_len`, leaving a note
/// that the content was cut. Returns `None` when nothing was collected.
pub fn title_prompt_content(turns: &[Turn], max_len: usize) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut total = 0usize;

    for turn in turns {
        let part = match turn.role() {
            Role::User => format!("用户: {}", turn.content()),
            Role::Assistant => format!("AI: {}", preview(turn.content())),
        };
        let len = part.chars().count();
        if total + len > max_len {
            parts.push(TRUNCATION_NOTE.to_string());
            break;
        }
        total += len;
        parts.push(part);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() > MAX_CONTENT_PREVIEW {
        let cut: String = content.chars().take(MAX_CONTENT_PREVIEW).collect();
        format!("{}...", cut)
    } else {
        content.to_string()
    }
}

/// Messages for a title generation request, or `None` for an empty selection
pub fn title_messages(turns: &[Turn]) -> Option<Vec<ApiMessage>> {
    let content = title_prompt_content(turns, MAX_TITLE_GEN_LENGTH)?;
    Some(vec![
        ApiMessage::system(title_system_prompt()),
        ApiMessage::user(content),
    ])
}

/// Normalizes a model reply into a usable title
///
/// Strips surrounding quotes, folds newlines and runs of whitespace into
/// single spaces, and rejects empty or generic titles.
///
/// # Examples
///
/// ```
/// use deepchat::history::summary::clean_generated_title;
///
/// assert_eq!(clean_generated_title("\"Rust 入门\"\n"), Some("Rust 入门".to_string()));
/// assert_eq!(clean_generated_title("Chat History"), None);
/// ```
pub fn clean_generated_title(raw: &str) -> Option<String> {
    let stripped = raw
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim();
    let title = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() || GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
        return None;
    }
    Some(title)
}
