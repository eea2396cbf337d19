//! Display titles for stored conversations

use chrono::NaiveDateTime;

/// Standard document header written when no title was chosen
pub const DEFAULT_DOCUMENT_HEADER: &str = "# DeepSeek AI 对话记录";

/// Prefix of generated history file names
pub const FILE_NAME_PREFIX: &str = "deepseek_chat_";

/// Timestamp layout embedded in generated file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Number of leading lines inspected when extracting a title from a file
pub const TITLE_SCAN_LINES: usize = 10;

/// Derives a short label for a stored conversation
///
/// The first matching rule wins:
/// 1. a `标题:` metadata line
/// 2. a `# ` heading other than the standard document header
/// 3. the timestamp embedded in a generated file name
/// 4. the file name stem
///
/// # Examples
///
/// ```
/// use deepchat::history::title::extract_title;
///
/// assert_eq!(extract_title(&["标题: Foo", "# Bar"], "x.md"), "Foo");
/// assert_eq!(
///     extract_title(&[], "deepseek_chat_20240115_093000"),
///     "2024-01-15 09:30:00"
/// );
/// ```
pub fn extract_title(first_lines: &[&str], filename: &str) -> String {
    for line in first_lines.iter().take(TITLE_SCAN_LINES).map(|l| l.trim()) {
        if let Some(rest) = line.strip_prefix("标题:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    for line in first_lines.iter().take(TITLE_SCAN_LINES).map(|l| l.trim()) {
        if line == DEFAULT_DOCUMENT_HEADER {
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    title_from_filename(filename)
}

/// Title derived from the file name alone
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);

    match stem.strip_prefix(FILE_NAME_PREFIX) {
        Some(timestamp) => match NaiveDateTime::parse_from_str(timestamp, FILE_TIMESTAMP_FORMAT) {
            Ok(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(e) => {
                tracing::debug!("Unparseable timestamp in {}: {}", filename, e);
                stem.to_string()
            }
        },
        None => stem.to_string(),
    }
}
