//! Configuration management for deepchat
//!
//! This module handles loading, parsing, validating, and saving
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Model without a visible reasoning phase unless thinking is requested
pub const CHAT_MODEL: &str = "deepseek-chat";

/// Model that always streams a reasoning phase before its answer
pub const REASONER_MODEL: &str = "deepseek-reasoner";

/// Known models and their output token ceilings
pub const KNOWN_MODELS: &[(&str, u32)] = &[(CHAT_MODEL, 8000), (REASONER_MODEL, 64000)];

/// Main configuration structure for deepchat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API connection and sampling settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Where exported conversations live
    #[serde(default)]
    pub history: HistoryConfig,
    /// Terminal rendering
    #[serde(default)]
    pub display: DisplayConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer key sent with every request
    #[serde(default)]
    pub api_key: String,

    /// API base URL; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens in a reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature, 0.0 to 2.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Stream replies as they are generated
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// Ask non-reasoner models for a visible reasoning phase
    #[serde(default)]
    pub thinking_enabled: bool,
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    CHAT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_stream() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stream: default_stream(),
            thinking_enabled: false,
        }
    }
}

/// History directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_dir")]
    pub dir: PathBuf,
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("chat_history")
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
        }
    }
}

/// Terminal display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Re-render finished Markdown replies as formatted text
    #[serde(default = "default_true")]
    pub rerender_markdown: bool,

    /// Print a timestamp next to each message header
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rerender_markdown: true,
            show_timestamps: true,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("DEEPCHAT_API_KEY") {
            self.provider.api_key = api_key;
        }

        if let Ok(base_url) = std::env::var("DEEPCHAT_BASE_URL") {
            self.provider.base_url = base_url;
        }

        if let Ok(model) = std::env::var("DEEPCHAT_MODEL") {
            self.provider.model = model;
        }

        if let Ok(max_tokens) = std::env::var("DEEPCHAT_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.provider.max_tokens = value;
            } else {
                tracing::warn!("Invalid DEEPCHAT_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(temperature) = std::env::var("DEEPCHAT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.provider.temperature = value;
            } else {
                tracing::warn!("Invalid DEEPCHAT_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(stream) = std::env::var("DEEPCHAT_STREAM") {
            match parse_bool(&stream) {
                Some(value) => self.provider.stream = value,
                None => tracing::warn!("Invalid DEEPCHAT_STREAM: {}", stream),
            }
        }

        if let Ok(thinking) = std::env::var("DEEPCHAT_THINKING") {
            match parse_bool(&thinking) {
                Some(value) => self.provider.thinking_enabled = value,
                None => tracing::warn!("Invalid DEEPCHAT_THINKING: {}", thinking),
            }
        }

        if let Ok(dir) = std::env::var("DEEPCHAT_HISTORY_DIR") {
            self.history.dir = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(dir) = &cli.history_dir {
            self.history.dir = dir.clone();
        }

        if let crate::cli::Commands::Chat {
            model,
            thinking,
            no_stream,
            ..
        } = &cli.command
        {
            if let Some(model) = model {
                self.provider.model = model.clone();
            }
            if *thinking {
                self.provider.thinking_enabled = true;
            }
            if *no_stream {
                self.provider.stream = false;
            }
        }
    }

    /// Writes the configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChatError::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)
            .map_err(|e| ChatError::Config(format!("Failed to write config file: {}", e)))?;
        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Whether the configured model always reasons
    pub fn is_reasoner_model(&self) -> bool {
        is_reasoner_model(&self.provider.model)
    }

    /// Whether replies will carry a reasoning phase
    pub fn reasoning_active(&self) -> bool {
        self.is_reasoner_model() || self.provider.thinking_enabled
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ChatError::Config("base_url cannot be empty".to_string()).into());
        }

        if self.provider.model.trim().is_empty() {
            return Err(ChatError::Config("model cannot be empty".to_string()).into());
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ChatError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.provider.temperature
            ))
            .into());
        }

        if self.provider.max_tokens == 0 {
            return Err(ChatError::Config("max_tokens must be greater than 0".to_string()).into());
        }

        if let Some(limit) = model_token_limit(&self.provider.model) {
            if self.provider.max_tokens > limit {
                return Err(ChatError::Config(format!(
                    "max_tokens for {} must be at most {}, got {}",
                    self.provider.model, limit, self.provider.max_tokens
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            history: HistoryConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Whether `model` always emits a reasoning phase
pub fn is_reasoner_model(model: &str) -> bool {
    model == REASONER_MODEL
}

/// Output token ceiling of a known model
pub fn model_token_limit(model: &str) -> Option<u32> {
    KNOWN_MODELS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, limit)| *limit)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "DEEPCHAT_API_KEY",
        "DEEPCHAT_BASE_URL",
        "DEEPCHAT_MODEL",
        "DEEPCHAT_MAX_TOKENS",
        "DEEPCHAT_TEMPERATURE",
        "DEEPCHAT_STREAM",
        "DEEPCHAT_THINKING",
        "DEEPCHAT_HISTORY_DIR",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.base_url, "https://api.deepseek.com");
        assert_eq!(config.provider.model, "deepseek-chat");
        assert_eq!(config.provider.max_tokens, 2000);
        assert!(config.provider.stream);
        assert!(!config.provider.thinking_enabled);
        assert_eq!(config.history.dir, PathBuf::from("chat_history"));
        assert!(config.display.rerender_markdown);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_base_url() {
        let mut config = Config::default();
        config.provider.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let mut config = Config::default();
        config.provider.temperature = 2.5;
        assert!(config.validate().is_err());
        config.provider.temperature = 2.0;
        assert!(config.validate().is_ok());
        config.provider.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_token_limits() {
        let mut config = Config::default();
        config.provider.max_tokens = 0;
        assert!(config.validate().is_err());

        config.provider.max_tokens = 9000;
        assert!(config.validate().is_err());

        config.provider.model = REASONER_MODEL.to_string();
        assert!(config.validate().is_ok());

        config.provider.model = "custom-model".to_string();
        config.provider.max_tokens = 200_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reasoning_active() {
        let mut config = Config::default();
        assert!(!config.reasoning_active());
        config.provider.thinking_enabled = true;
        assert!(config.reasoning_active());
        config.provider.thinking_enabled = false;
        config.provider.model = REASONER_MODEL.to_string();
        assert!(config.is_reasoner_model());
        assert!(config.reasoning_active());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  api_key: sk-test
  model: deepseek-reasoner
  max_tokens: 4000
history:
  dir: /tmp/chats
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.api_key, "sk-test");
        assert_eq!(config.provider.model, "deepseek-reasoner");
        assert_eq!(config.provider.max_tokens, 4000);
        assert_eq!(config.provider.base_url, "https://api.deepseek.com");
        assert_eq!(config.history.dir, PathBuf::from("/tmp/chats"));
        assert!(config.display.show_timestamps);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider:\n  model: from-file\n  max_tokens: 100\n").unwrap();

        std::env::set_var("DEEPCHAT_MODEL", "from-env");
        std::env::set_var("DEEPCHAT_MAX_TOKENS", "not-a-number");
        std::env::set_var("DEEPCHAT_STREAM", "off");
        std::env::set_var("DEEPCHAT_HISTORY_DIR", "/tmp/env-history");

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        clear_env();

        assert_eq!(config.provider.model, "from-env");
        assert_eq!(config.provider.max_tokens, 100);
        assert!(!config.provider.stream);
        assert_eq!(config.history.dir, PathBuf::from("/tmp/env-history"));
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("DEEPCHAT_MODEL", "from-env");
        let cli = Cli {
            history_dir: Some(PathBuf::from("/tmp/cli-history")),
            command: Commands::Chat {
                model: Some("from-cli".to_string()),
                thinking: true,
                no_stream: true,
                load: None,
            },
            ..Cli::default()
        };

        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.provider.model, "from-cli");
        assert!(config.provider.thinking_enabled);
        assert!(!config.provider.stream);
        assert_eq!(config.history.dir, PathBuf::from("/tmp/cli-history"));
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "provider: [unclosed").unwrap();
        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::Config(_))
        ));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.provider.api_key = "sk-saved".to_string();
        config.display.show_timestamps = false;
        config.save(&path).unwrap();

        let loaded: Config =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }
}
