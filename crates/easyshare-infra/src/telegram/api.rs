//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `getMe`, `getUpdates`, `sendMessage`, `getChatMember`
//! and `getChatAdministrators`. All methods return typed responses.

use std::sync::Arc;
use std::time::Duration;

use easyshare_core::platform::ChatPlatform;
use easyshare_types::chat::{ChatId, ChatMember, MemberStatus};
use easyshare_types::error::PlatformError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::types::{ApiResponse, TgChatMember, Update, User};

/// Timeout for every call except the long poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level Telegram Bot API client. Cheap to clone.
#[derive(Clone)]
pub struct TelegramApi {
    client: Client,
    base_url: String,
    token: Arc<SecretString>,
}

impl TelegramApi {
    /// Create a new API client for the given bot token.
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, "https://api.telegram.org")
    }

    /// Create a new API client with a custom base URL (for testing or a
    /// local Bot API server).
    pub fn with_base_url(token: SecretString, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token.expose_secret())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<T, PlatformError> {
        let resp = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;

        let api_resp: ApiResponse<T> = resp.json().await.map_err(http_error)?;
        if !api_resp.ok {
            let desc = api_resp.description.unwrap_or_default();
            warn!(method, "telegram call failed: {desc}");
            return Err(PlatformError::Api(desc));
        }

        api_resp
            .result
            .ok_or_else(|| PlatformError::Decode(format!("{method}: missing result")))
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User, PlatformError> {
        self.call("getMe", json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-poll for new updates.
    ///
    /// `offset` should be set to `last_update_id + 1` to acknowledge
    /// previously received updates.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, PlatformError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }

        self.call(
            "getUpdates",
            body,
            Duration::from_secs(timeout_secs) + REQUEST_TIMEOUT,
        )
        .await
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), PlatformError> {
        debug!(chat_id, "sendMessage");
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({ "chat_id": chat_id, "text": text }),
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }

    pub async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<ChatMember, PlatformError> {
        let member: TgChatMember = self
            .call(
                "getChatMember",
                json!({ "chat_id": chat_id, "user_id": user_id }),
                REQUEST_TIMEOUT,
            )
            .await?;
        member.try_into()
    }

    pub async fn get_chat_administrators(
        &self,
        chat_id: i64,
    ) -> Result<Vec<ChatMember>, PlatformError> {
        let members: Vec<TgChatMember> = self
            .call(
                "getChatAdministrators",
                json!({ "chat_id": chat_id }),
                REQUEST_TIMEOUT,
            )
            .await?;
        members.into_iter().map(ChatMember::try_from).collect()
    }
}

/// reqwest errors carry the request URL, which embeds the bot token.
fn http_error(e: reqwest::Error) -> PlatformError {
    if e.is_decode() {
        PlatformError::Decode(e.without_url().to_string())
    } else {
        PlatformError::Http(e.without_url().to_string())
    }
}

impl ChatPlatform for TelegramApi {
    async fn member_status(
        &self,
        chat_id: ChatId,
        user_id: i64,
    ) -> Result<MemberStatus, PlatformError> {
        Ok(self.get_chat_member(chat_id.0, user_id).await?.status)
    }

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, PlatformError> {
        self.get_chat_administrators(chat_id.0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_embeds_token() {
        let api = TelegramApi::with_base_url(
            SecretString::from("123:abc".to_string()),
            "http://localhost:8081/",
        );
        assert_eq!(
            api.method_url("getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error_without_token() {
        let api = TelegramApi::with_base_url(
            SecretString::from("123:secret-token".to_string()),
            "http://127.0.0.1:9",
        );
        let err = api.get_me().await.unwrap_err();
        assert!(matches!(err, PlatformError::Http(_)));
        assert!(!err.to_string().contains("secret-token"));
    }
}
