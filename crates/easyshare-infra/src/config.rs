//! Configuration loader for easyshare.
//!
//! Reads `config.toml` from the data directory (`~/.easyshare/` in production)
//! and deserializes it into [`BotConfig`]. Falls back to defaults when the
//! file is missing or malformed. The bot token never lives in the file; it
//! comes from the command line or the environment.

use std::path::{Path, PathBuf};

use easyshare_types::config::BotConfig;
use easyshare_types::error::ConfigError;
use secrecy::SecretString;

/// Environment variables consulted for the bot token, in priority order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["EASYSHARE_BOT_TOKEN", "BOT_TOKEN"];

/// Upper bound Telegram accepts for the `getUpdates` long-poll timeout.
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `EASYSHARE_DATA_DIR` environment variable
/// 2. `~/.easyshare`
/// 3. `./.easyshare`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EASYSHARE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".easyshare");
    }

    PathBuf::from(".easyshare")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`BotConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_bot_config(data_dir: &Path) -> BotConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return BotConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BotConfig::default();
        }
    };

    match toml::from_str::<BotConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BotConfig::default()
        }
    }
}

/// Reject settings the Bot API would refuse at runtime.
pub fn validate_config(config: &BotConfig) -> Result<(), ConfigError> {
    if config.telegram.poll_timeout_secs > MAX_POLL_TIMEOUT_SECS {
        return Err(ConfigError::Invalid(format!(
            "telegram.poll_timeout_secs must be at most {MAX_POLL_TIMEOUT_SECS}, got {}",
            config.telegram.poll_timeout_secs
        )));
    }
    if !config.telegram.api_base_url.starts_with("http://")
        && !config.telegram.api_base_url.starts_with("https://")
    {
        return Err(ConfigError::Invalid(format!(
            "telegram.api_base_url must be an http(s) URL, got '{}'",
            config.telegram.api_base_url
        )));
    }
    if config.database_file.trim().is_empty() {
        return Err(ConfigError::Invalid("database_file must not be empty".to_string()));
    }
    Ok(())
}

/// Resolve the bot token.
///
/// Priority:
/// 1. `--token` from the command line
/// 2. `EASYSHARE_BOT_TOKEN`
/// 3. `BOT_TOKEN`
pub fn resolve_token(cli_token: Option<String>) -> Result<SecretString, ConfigError> {
    resolve_token_with(cli_token, |key| std::env::var(key).ok())
}

fn resolve_token_with(
    cli_token: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    cli_token
        .into_iter()
        .chain(TOKEN_ENV_VARS.iter().filter_map(|key| env(key)))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .map(SecretString::from)
        .ok_or(ConfigError::MissingToken)
}
