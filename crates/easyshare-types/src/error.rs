use thiserror::Error;

/// Errors from repository operations (used by trait definitions in easyshare-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised while talking to the chat platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(String),

    #[error("platform api error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token not configured (set --token, EASYSHARE_BOT_TOKEN or BOT_TOKEN)")]
    MissingToken,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
