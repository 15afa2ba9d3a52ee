//! Serde types for the Telegram Bot API.
//!
//! Only the fields the bot reads are deserialized; everything else is
//! ignored.

use easyshare_types::chat::{ChatMember, ChatUser, MemberStatus};
use easyshare_types::error::PlatformError;
use serde::Deserialize;

/// Generic Telegram API response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub description: Option<String>,
    pub result: Option<T>,
}

/// A Telegram Update object from `getUpdates`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

impl From<User> for ChatUser {
    fn from(user: User) -> Self {
        ChatUser {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            is_bot: user.is_bot,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
}

/// Result of `getChatMember` / element of `getChatAdministrators`.
#[derive(Debug, Deserialize)]
pub struct TgChatMember {
    pub status: String,
    pub user: User,
}

impl TryFrom<TgChatMember> for ChatMember {
    type Error = PlatformError;

    fn try_from(member: TgChatMember) -> Result<Self, Self::Error> {
        let status: MemberStatus = member.status.parse().map_err(PlatformError::Decode)?;
        Ok(ChatMember {
            user: member.user.into(),
            status,
        })
    }
}
