//! Admin guard for privileged commands.

use easyshare_types::chat::{ChatId, ChatUser, MemberStatus};
use easyshare_types::error::PlatformError;
use tracing::debug;

use crate::platform::ChatPlatform;

/// Outcome of an authorization check, consumed by the caller before it
/// touches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied { status: MemberStatus },
}

/// Check that `user` is the creator or an administrator of `chat_id`.
///
/// The role is fetched from the platform on every call. A platform failure
/// is returned as an error; it is never treated as a grant.
pub async fn authorize_admin<P: ChatPlatform>(
    platform: &P,
    chat_id: ChatId,
    user: &ChatUser,
) -> Result<Authorization, PlatformError> {
    let status = platform.member_status(chat_id, user.id).await?;
    debug!(chat_id = chat_id.0, user_id = user.id, %status, "resolved member status");

    if status.is_privileged() {
        Ok(Authorization::Granted)
    } else {
        Ok(Authorization::Denied { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, user};

    #[tokio::test]
    async fn test_admin_and_creator_are_granted() {
        let platform = MockPlatform::new()
            .with_member(ChatId(1), 10, MemberStatus::Creator)
            .with_member(ChatId(1), 11, MemberStatus::Administrator);

        let creator = authorize_admin(&platform, ChatId(1), &user(10, "carol"))
            .await
            .unwrap();
        let admin = authorize_admin(&platform, ChatId(1), &user(11, "adam"))
            .await
            .unwrap();

        assert_eq!(creator, Authorization::Granted);
        assert_eq!(admin, Authorization::Granted);
    }

    #[tokio::test]
    async fn test_member_is_denied() {
        let platform = MockPlatform::new().with_member(ChatId(1), 12, MemberStatus::Member);

        let result = authorize_admin(&platform, ChatId(1), &user(12, "mia"))
            .await
            .unwrap();

        assert_eq!(
            result,
            Authorization::Denied {
                status: MemberStatus::Member
            }
        );
    }

    #[tokio::test]
    async fn test_role_is_scoped_to_chat() {
        let platform = MockPlatform::new().with_member(ChatId(1), 10, MemberStatus::Creator);

        let elsewhere = authorize_admin(&platform, ChatId(2), &user(10, "carol"))
            .await
            .unwrap();

        assert_eq!(
            elsewhere,
            Authorization::Denied {
                status: MemberStatus::Member
            }
        );
    }

    #[tokio::test]
    async fn test_platform_failure_is_an_error() {
        let platform = MockPlatform::new().failing();

        let result = authorize_admin(&platform, ChatId(1), &user(10, "carol")).await;

        assert!(matches!(result, Err(PlatformError::Api(_))));
    }
}
