//! Configuration types for the easyshare bot.
//!
//! `BotConfig` represents the `config.toml` found in the data directory.
//! Every field has a default so an absent or empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Chats the bot answers in. Empty means every chat.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,

    /// SQLite file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Whether the bot should respond to commands from `chat_id`.
    pub fn accepts_chat(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            allowed_chats: Vec::new(),
            database_file: default_database_file(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_database_file() -> String {
    "easyshare.db".to_string()
}

/// Telegram Bot API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
