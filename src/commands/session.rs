//! Interactive chat session state
//!
//! A [`ChatSession`] owns the live conversation, the pair selection used by
//! `/export`, and the provider. The REPL in [`super::chat`] feeds it user
//! input; everything it shows goes through a [`DisplaySurface`].

use super::special_commands::{print_help, LoadMode, SpecialCommand};
use crate::config::{is_reasoner_model, Config};
use crate::conversation::{ApiMessage, Conversation, Turn};
use crate::display::transcript::{assistant_label, render_assistant, render_turns, render_user};
use crate::display::{DisplaySurface, StyleTag};
use crate::error::{ChatError, Result};
use crate::history::HistoryStore;
use crate::providers::{build_request, ChatProvider, ChatRequest, StreamChunk};
use crate::stream::StreamState;
use chrono::Local;
use futures::StreamExt;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Characters of the user message shown by `/pairs`
const PAIR_PREVIEW_CHARS: usize = 40;

/// What the REPL should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

/// One interactive conversation with the model
pub struct ChatSession {
    config: Config,
    provider: Box<dyn ChatProvider>,
    store: HistoryStore,
    conversation: Conversation,
    selected: BTreeSet<usize>,
    config_path: Option<PathBuf>,
}

impl ChatSession {
    pub fn new(config: Config, provider: Box<dyn ChatProvider>, store: HistoryStore) -> Self {
        Self {
            config,
            provider,
            store,
            conversation: Conversation::new(),
            selected: BTreeSet::new(),
            config_path: None,
        }
    }

    /// Sets the file `/save` writes to
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Selected pair indices (0-based)
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    fn timestamp(&self) -> Option<String> {
        self.config
            .display
            .show_timestamps
            .then(|| Local::now().format("%H:%M:%S").to_string())
    }

    /// Sends a user message and renders the reply
    ///
    /// The user turn and the reply are committed together, and only once the
    /// reply is complete. A failed or abandoned request, or a reply with no
    /// answer text, leaves the conversation unchanged.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the request or the stream fails
    pub async fn send_message(
        &mut self,
        text: &str,
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        render_user(surface, text, self.timestamp().as_deref());

        let mut messages = self.conversation.api_messages();
        messages.push(ApiMessage::user(text));
        let request = build_request(&self.config.provider, messages, self.config.provider.stream);

        let reply = if request.stream {
            self.stream_reply(&request, surface).await?
        } else {
            let turn = self.provider.complete(&request).await?.into_turn();
            render_assistant(surface, &turn, self.timestamp().as_deref());
            turn
        };

        if reply.content().trim().is_empty() {
            tracing::warn!(
                reasoning = reply.reasoning().is_some(),
                "Reply had no answer; exchange not committed"
            );
            notice(surface, "⚠️ 回复没有内容，本轮对话未保存");
            return Ok(());
        }

        tracing::debug!(
            answer_len = reply.content().len(),
            reasoning = reply.reasoning().is_some(),
            "Committing exchange"
        );
        self.conversation.push(Turn::user(text));
        self.conversation.push(reply);
        Ok(())
    }

    async fn stream_reply(
        &self,
        request: &ChatRequest,
        surface: &mut dyn DisplaySurface,
    ) -> Result<Turn> {
        let mut chunks = self.provider.stream(request).await?;

        let mut state = StreamState::begin(self.config.reasoning_active());
        state.announce(&assistant_label(self.timestamp().as_deref()), surface);

        while let Some(chunk) = chunks.next().await {
            match chunk? {
                StreamChunk::Reasoning(text) => state.ingest_reasoning(&text, surface),
                StreamChunk::Answer(text) => state.ingest_answer(&text, surface),
            }
        }

        Ok(state.finalize(surface))
    }

    /// Executes a special command
    ///
    /// # Errors
    ///
    /// Returns error when export, load, or a configuration change fails.
    /// The session is left as it was before the command.
    pub async fn handle_command(
        &mut self,
        command: SpecialCommand,
        surface: &mut dyn DisplaySurface,
    ) -> Result<CommandOutcome> {
        match command {
            SpecialCommand::Help => print_help(),
            SpecialCommand::ShowStatus => self.show_status(surface),
            SpecialCommand::ListPairs => self.list_pairs(surface),
            SpecialCommand::Select(pairs) => self.select(pairs, surface),
            SpecialCommand::Unselect(pairs) => {
                for pair in pairs {
                    self.selected.remove(&pair);
                }
                notice(surface, &format!("已选择 {} 对对话", self.selected.len()));
            }
            SpecialCommand::ClearSelection => {
                self.selected.clear();
                notice(surface, "已清除选择，导出时将包含全部对话");
            }
            SpecialCommand::DeletePair(pair) => {
                let removed = self.conversation.remove_pair(pair);
                if removed == 0 {
                    return Err(ChatError::Command(format!("对话 {} 不存在", pair + 1)).into());
                }
                self.selected.clear();
                notice(
                    surface,
                    &format!("🗑️ 已删除对话 {}（{} 条消息），选择已清除", pair + 1, removed),
                );
            }
            SpecialCommand::Export { title } => {
                let path = self.export(title, surface).await?;
                notice(surface, &format!("✅ 对话已导出到: {}", path.display()));
            }
            SpecialCommand::Load { file, mode } => {
                let path = self.store.resolve(&file);
                self.load_into(path, mode, surface)?;
            }
            SpecialCommand::History => self.list_history(surface)?,
            SpecialCommand::Clear => {
                self.conversation.clear();
                self.selected.clear();
                notice(surface, "🆕 已开始新对话");
            }
            SpecialCommand::Thinking(enabled) => self.set_thinking(enabled, surface),
            SpecialCommand::SwitchModel(model) => self.switch_model(model, surface)?,
            SpecialCommand::SaveConfig => {
                let path = self
                    .config_path
                    .as_deref()
                    .ok_or_else(|| ChatError::Command("没有可写入的配置文件".to_string()))?;
                self.save_config(path, surface)?;
            }
            SpecialCommand::Exit => return Ok(CommandOutcome::Exit),
            SpecialCommand::None => {}
        }
        Ok(CommandOutcome::Continue)
    }

    /// Loads a history file into the session
    ///
    /// An empty session always takes the loaded conversation as-is. Otherwise
    /// `mode` decides between appending and replacing; replacing also clears
    /// the selection.
    pub fn load_into(
        &mut self,
        path: PathBuf,
        mode: LoadMode,
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        let loaded = self.store.load(&path)?;
        let count = loaded.len();

        render_turns(surface, loaded.turns());

        if self.conversation.is_empty() || mode == LoadMode::Replace {
            self.conversation.replace(loaded);
            self.selected.clear();
        } else {
            self.conversation.extend(loaded);
        }

        notice(surface, &format!("📥 已加载 {} 条对话记录", count));
        Ok(())
    }

    async fn export(
        &self,
        title: Option<String>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<PathBuf> {
        if self.conversation.is_empty() {
            return Err(ChatError::NothingToExport.into());
        }

        let title = match title {
            Some(title) => Some(title),
            None => {
                notice(surface, "正在生成对话标题...");
                let (turns, _) = self.conversation.select_for_export(&self.selected);
                match self
                    .provider
                    .generate_title(&turns, &self.config.provider.model)
                    .await
                {
                    Ok(title) => title,
                    Err(e) => {
                        tracing::warn!("Title generation failed: {}", e);
                        None
                    }
                }
            }
        };

        self.store.export(
            &self.conversation,
            &self.selected,
            title.as_deref(),
            &self.config.provider.model,
            Local::now().naive_local(),
        )
    }

    fn save_config(&self, path: &Path, surface: &mut dyn DisplaySurface) -> Result<()> {
        self.config.save(path)?;
        notice(surface, &format!("💾 设置已保存到: {}", path.display()));
        Ok(())
    }

    fn show_status(&self, surface: &mut dyn DisplaySurface) {
        let provider = &self.config.provider;
        let lines = [
            format!("模型:       {}", provider.model),
            format!(
                "思考模式:   {}",
                if self.config.reasoning_active() { "开启" } else { "关闭" }
            ),
            format!(
                "流式输出:   {}",
                if provider.stream { "开启" } else { "关闭" }
            ),
            format!("消息数:     {}", self.conversation.len()),
            format!("对话对数:   {}", self.conversation.pairs().len()),
            format!("已选择:     {}", self.selected.len()),
            format!("历史目录:   {}", self.store.dir().display()),
        ];
        for line in lines {
            notice(surface, &line);
        }
    }

    fn list_pairs(&self, surface: &mut dyn DisplaySurface) {
        let pairs = self.conversation.pairs();
        if pairs.is_empty() {
            notice(surface, "当前没有对话");
            return;
        }
        for (i, pair) in pairs.iter().enumerate() {
            let marker = if self.selected.contains(&i) { "*" } else { " " };
            let preview = preview(self.conversation.turns()[pair.user_index].content());
            let status = if pair.assistant_index.is_some() {
                ""
            } else {
                " (无回复)"
            };
            notice(surface, &format!("[{}] {}. {}{}", marker, i + 1, preview, status));
        }
    }

    fn select(&mut self, pairs: Vec<usize>, surface: &mut dyn DisplaySurface) {
        let available = self.conversation.pairs().len();
        for pair in pairs {
            if pair < available {
                self.selected.insert(pair);
            } else {
                surface.append_text(
                    &format!("对话 {} 不存在，已忽略\n", pair + 1),
                    StyleTag::Error,
                );
            }
        }
        notice(surface, &format!("已选择 {} 对对话", self.selected.len()));
    }

    fn list_history(&self, surface: &mut dyn DisplaySurface) -> Result<()> {
        let entries = self.store.list()?;
        if entries.is_empty() {
            notice(surface, "暂无历史记录");
            return Ok(());
        }
        for (i, entry) in entries.iter().enumerate() {
            notice(
                surface,
                &format!(
                    "{}. {} ({}, {})",
                    i + 1,
                    entry.title,
                    entry.file_name,
                    entry.modified.format("%Y-%m-%d %H:%M")
                ),
            );
        }
        Ok(())
    }

    fn set_thinking(&mut self, enabled: bool, surface: &mut dyn DisplaySurface) {
        if self.config.is_reasoner_model() {
            notice(
                surface,
                &format!("{} 始终输出思考过程", self.config.provider.model),
            );
        }
        self.config.provider.thinking_enabled = enabled;
        notice(
            surface,
            if enabled {
                "🧠 思考模式已开启"
            } else {
                "思考模式已关闭"
            },
        );
    }

    fn switch_model(&mut self, model: String, surface: &mut dyn DisplaySurface) -> Result<()> {
        let previous = std::mem::replace(&mut self.config.provider.model, model);
        if let Err(e) = self.config.validate() {
            self.config.provider.model = previous;
            return Err(e);
        }
        tracing::info!(
            from = %previous,
            to = %self.config.provider.model,
            "Switched model"
        );
        let suffix = if is_reasoner_model(&self.config.provider.model) {
            "（推理模型）"
        } else {
            ""
        };
        notice(
            surface,
            &format!("已切换模型: {} → {}{}", previous, self.config.provider.model, suffix),
        );
        Ok(())
    }
}

fn notice(surface: &mut dyn DisplaySurface, text: &str) {
    surface.append_text(&format!("{}\n", text), StyleTag::Notice);
}

fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(PAIR_PREVIEW_CHARS).collect();
    if first_line.chars().count() > PAIR_PREVIEW_CHARS || content.lines().nth(1).is_some() {
        preview.push_str("...");
    }
    preview
}
