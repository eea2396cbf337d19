//! Test utilities for deepchat
//!
//! Temporary directories, fixture files, a baseline configuration, and a
//! scripted provider that replays canned replies without any network.

use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::providers::{ChatProvider, ChatRequest, Completion, StreamChunk};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Examples
///
/// ```
/// use deepchat::test_utils::temp_dir;
///
/// let dir = temp_dir();
/// assert!(dir.path().exists());
/// ```
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if the file cannot be written
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Configuration with defaults suitable for tests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = "test-key".to_string();
    config.provider.base_url = "http://localhost:0".to_string();
    config
}

/// Provider replaying a fixed completion or chunk sequence
pub struct ScriptedProvider {
    completion: Completion,
    chunks: Vec<StreamChunk>,
    fail_stream: bool,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedProvider {
    /// Non-streamed replies (and generated titles) return `content`
    pub fn completing(content: &str, reasoning: Option<&str>) -> Self {
        Self {
            completion: Completion {
                content: content.to_string(),
                reasoning: reasoning.map(str::to_string),
            },
            chunks: Vec::new(),
            fail_stream: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Streamed replies yield `chunks` in order
    pub fn streaming(chunks: Vec<StreamChunk>) -> Self {
        Self {
            chunks,
            ..Self::completing("", None)
        }
    }

    /// Streamed replies yield `chunks` and then a transport error
    pub fn failing_stream(chunks: Vec<StreamChunk>) -> Self {
        Self {
            fail_stream: true,
            ..Self::streaming(chunks)
        }
    }

    /// Handle to every request seen so far
    pub fn requests(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }

    fn record(&self, request: &ChatRequest) {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        self.record(request);
        Ok(self.completion.clone())
    }

    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamChunk>>> {
        self.record(request);
        let mut items: Vec<Result<StreamChunk>> = self.chunks.iter().cloned().map(Ok).collect();
        if self.fail_stream {
            items.push(Err(
                ChatError::Provider("connection reset".to_string()).into()
            ));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
