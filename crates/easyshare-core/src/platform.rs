//! Chat platform port.
//!
//! The command layer only needs two questions answered by the chat
//! transport: what role a user holds in a chat, and who the chat's
//! administrators are. Sending replies stays with the transport loop.

use easyshare_types::chat::{ChatId, ChatMember, MemberStatus};
use easyshare_types::error::PlatformError;

/// Membership queries against the chat platform (Telegram in production).
pub trait ChatPlatform: Send + Sync {
    /// Role of `user_id` in `chat_id`, queried live (never cached).
    fn member_status(
        &self,
        chat_id: ChatId,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<MemberStatus, PlatformError>> + Send;

    /// Creator and administrators of `chat_id`.
    fn administrators(
        &self,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMember>, PlatformError>> + Send;
}
