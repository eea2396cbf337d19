use super::codec::{decode, encode, ExportHeader};
use super::summary::FALLBACK_TITLE;
use super::title::{
    extract_title, title_from_filename, FILE_NAME_PREFIX, FILE_TIMESTAMP_FORMAT, TITLE_SCAN_LINES,
};
use crate::conversation::Conversation;
use crate::error::{ChatError, Result};
use anyhow::Context;
use chrono::{DateTime, Local, NaiveDateTime};
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A conversation file found in the history directory
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: DateTime<Local>,
    pub title: String,
}

/// Directory of exported conversations, one Markdown file each
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Opens a history directory, creating it when missing
    ///
    /// # Examples
    ///
    /// ```
    /// use deepchat::history::HistoryStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = HistoryStore::new(dir.path().join("chat_history")).unwrap();
    /// assert!(store.list().unwrap().is_empty());
    /// ```
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create history directory {}", dir.display()))
            .map_err(|e| ChatError::History(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for an export made at `now`
    pub fn default_file_name(now: NaiveDateTime) -> String {
        format!("{}{}.md", FILE_NAME_PREFIX, now.format(FILE_TIMESTAMP_FORMAT))
    }

    /// Lists stored conversations, newest first
    ///
    /// Only `.md` files are considered. Files with equal modification times
    /// are ordered by name, descending.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let read_dir = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read history directory {}", self.dir.display()))
            .map_err(|e| ChatError::History(e.to_string()))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable history entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let modified: DateTime<Local> = match metadata.modified() {
                Ok(time) => time.into(),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let title = self.title_for(&path);
            entries.push(HistoryEntry {
                path,
                file_name,
                modified,
                title,
            });
        }

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(entries)
    }

    /// Exports a conversation (or the selected pairs of it) to a new file
    ///
    /// Returns the path written.
    pub fn export(
        &self,
        conversation: &Conversation,
        selected_pairs: &BTreeSet<usize>,
        title: Option<&str>,
        model: &str,
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        let path = self.dir.join(Self::default_file_name(now));
        self.export_to(&path, conversation, selected_pairs, title, model, now)?;
        Ok(path)
    }

    /// Exports to an explicit path
    ///
    /// The document is written to a sibling temporary file and renamed over
    /// `path`, so a failed write leaves any existing file untouched.
    pub fn export_to(
        &self,
        path: &Path,
        conversation: &Conversation,
        selected_pairs: &BTreeSet<usize>,
        title: Option<&str>,
        model: &str,
        now: NaiveDateTime,
    ) -> Result<()> {
        let (turns, mode) = conversation.select_for_export(selected_pairs);
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_TITLE);
        let header = ExportHeader {
            title: title.to_string(),
            exported_at: now,
            model: model.to_string(),
            mode,
        };
        let text = encode(&turns, &header)?;

        let tmp = temp_path(path);
        fs::write(&tmp, text.as_bytes()).map_err(|e| ChatError::Export(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(ChatError::Export(e.to_string()).into());
        }

        tracing::info!(
            path = %path.display(),
            turns = turns.len(),
            mode = %mode,
            "Exported conversation"
        );
        Ok(())
    }

    /// Loads a stored conversation
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, and with
    /// [`ChatError::NoContentParsed`] when it holds no recognizable rounds.
    pub fn load(&self, path: &Path) -> Result<Conversation> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file {}", path.display()))?;
        let conversation = decode(&text);
        if conversation.is_empty() {
            return Err(ChatError::NoContentParsed(path.display().to_string()).into());
        }
        tracing::info!(path = %path.display(), turns = conversation.len(), "Loaded conversation");
        Ok(conversation)
    }

    /// Deletes a stored conversation
    pub fn delete(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(
                ChatError::History(format!("No such history file: {}", path.display())).into(),
            );
        }
        fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))?;
        tracing::info!(path = %path.display(), "Deleted conversation");
        Ok(())
    }

    /// Title of a stored conversation
    ///
    /// Reads at most the first lines of the file; when reading fails the
    /// title comes from the file name alone.
    pub fn title_for(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match read_head(path, TITLE_SCAN_LINES) {
            Ok(lines) => {
                let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
                extract_title(&refs, &file_name)
            }
            Err(e) => {
                tracing::warn!("Failed to read title from {}: {}", path.display(), e);
                title_from_filename(&file_name)
            }
        }
    }

    /// Resolves a user-supplied name to a path
    ///
    /// Bare file names resolve inside the history directory, with `.md`
    /// appended when no extension is given. Anything with a directory
    /// component is used as-is.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() || candidate.components().count() > 1 {
            return candidate.to_path_buf();
        }
        let mut path = self.dir.join(candidate);
        if path.extension().is_none() {
            path.set_extension("md");
        }
        path
    }
}

fn read_head(path: &Path, n: usize) -> std::io::Result<Vec<String>> {
    let file = fs::File::open(path)?;
    BufReader::new(file).lines().take(n).collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
