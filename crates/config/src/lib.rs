//! Configuration loading, validation, and management for AtomBot.
//!
//! Loads configuration from `~/.atombot/config.toml` with environment
//! variable overrides. Program records (pricing, curriculum, FAQ, ...) live in
//! a separate program file, or the copy bundled with the binary.

mod program;

pub use program::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables checked for an API key, highest priority first.
pub const API_KEY_ENV_VARS: &[&str] = &[
    "ATOMBOT_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "API_KEY",
];

/// The root configuration structure.
///
/// Maps directly to `~/.atombot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the text-generation service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Program data file; the bundled program is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_file: Option<PathBuf>,

    /// Text-generation backend
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Conversation behaviour
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Who the assistant speaks as
    #[serde(default)]
    pub persona: PersonaConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("program_file", &self.program_file)
            .field("provider", &self.provider)
            .field("assistant", &self.assistant)
            .field("persona", &self.persona)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "gemini" or an OpenAI-compatible name ("openai", "openrouter", "ollama", ...)
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_provider_kind() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// First model message of every conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Shown in place of a reply when the service fails
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    /// Only replay the last N turns (user + model pairs); unset replays all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window_turns: Option<usize>,

    /// Per-reply timeout in seconds, 0 disables
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

fn default_greeting() -> String {
    "Yo! 我是 Atom 的招募小幫手。有什麼想問的嗎？儘管出招！🤘".into()
}
fn default_fallback_message() -> String {
    "抱歉，目前諮詢人數眾多，請稍後再試，或直接參考頁面下方的 FAQ！ 🤖".into()
}
fn default_reply_timeout_secs() -> u64 {
    60
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            fallback_message: default_fallback_message(),
            history_window_turns: None,
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Organisation running the program
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_program_name")]
    pub program_name: String,

    /// The role applicants are recruited for
    #[serde(default = "default_program_title")]
    pub program_title: String,

    /// Language replies must be written in
    #[serde(default = "default_language")]
    pub language: String,

    /// Tone rules, one per line of the `[TONE]` section
    #[serde(default = "default_tone")]
    pub tone: Vec<String>,
}

fn default_assistant_name() -> String {
    "Atom 招募小幫手".into()
}
fn default_app_name() -> String {
    "Atom Skool".into()
}
fn default_program_name() -> String {
    "2026 自主學習引導師培訓計畫".into()
}
fn default_program_title() -> String {
    "自主學習引導師 (Self-Directed Learning Facilitator)".into()
}
fn default_language() -> String {
    "Traditional Chinese (繁體中文)".into()
}
fn default_tone() -> Vec<String> {
    vec![
        "Professional, inspiring, and energetic (Interesting Soul).".into(),
        "Encourage users to apply or book a 1:1 chat.".into(),
        "Explain the donation mechanism clearly as a mutual investment.".into(),
    ]
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            app_name: default_app_name(),
            program_name: default_program_name(),
            program_title: default_program_title(),
            language: default_language(),
            tone: default_tone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.atombot/config.toml).
    ///
    /// Environment overrides:
    /// - API key: `ATOMBOT_API_KEY`, `GEMINI_API_KEY`, `GOOGLE_API_KEY`, `API_KEY`
    ///   (only when the file has none)
    /// - `ATOMBOT_PROVIDER`, `ATOMBOT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = API_KEY_ENV_VARS
                .iter()
                .filter_map(|key| lookup(key))
                .find(|value| !value.trim().is_empty());
        }

        if let Some(kind) = lookup("ATOMBOT_PROVIDER") {
            self.provider.kind = kind;
        }

        if let Some(model) = lookup("ATOMBOT_MODEL") {
            self.provider.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".atombot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.assistant.greeting.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "assistant.greeting must not be empty".into(),
            ));
        }

        if self.assistant.fallback_message.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "assistant.fallback_message must not be empty".into(),
            ));
        }

        if self.assistant.history_window_turns == Some(0) {
            return Err(ConfigError::ValidationError(
                "assistant.history_window_turns must be at least 1 (omit it to replay everything)"
                    .into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Program data from `program_file`, or the bundled program.
    pub fn load_program(&self) -> Result<ProgramData, ConfigError> {
        match &self.program_file {
            Some(path) => ProgramData::load_from(path),
            None => Ok(ProgramData::bundled()),
        }
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> Result<String, ConfigError> {
        Self::default().to_toml()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            program_file: None,
            provider: ProviderConfig::default(),
            assistant: AssistantConfig::default(),
            persona: PersonaConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to render config as TOML: {0}")]
    SerializeError(String),
}
