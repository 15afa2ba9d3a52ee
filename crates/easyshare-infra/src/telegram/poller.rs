//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Every text message from an accepted chat becomes an [`Invocation`] and is
//! dispatched on its own task; the reply, if any, is sent back to the chat.

use std::sync::Arc;
use std::time::Duration;

use easyshare_core::command::{CommandDispatcher, Invocation};
use easyshare_core::repository::account::AccountRepository;
use easyshare_core::repository::service::ServiceRepository;
use easyshare_core::repository::usage::UsageRepository;
use easyshare_types::chat::{ChatId, ChatUser};
use easyshare_types::config::BotConfig;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::api::TelegramApi;
use super::types::Message;

const MAX_BACKOFF_SECS: u64 = 60;

/// Run the long-polling loop until `cancel` fires, then wait for in-flight
/// commands to finish.
pub async fn poll_loop<S, A, U>(
    api: TelegramApi,
    dispatcher: Arc<CommandDispatcher<S, A, U, TelegramApi>>,
    config: &BotConfig,
    cancel: CancellationToken,
) where
    S: ServiceRepository + 'static,
    A: AccountRepository + 'static,
    U: UsageRepository + 'static,
{
    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1u64;
    let mut in_flight = JoinSet::new();

    info!(
        allowed_chats = ?config.allowed_chats,
        poll_timeout = config.telegram.poll_timeout_secs,
        "Telegram poller started"
    );

    loop {
        let updates = tokio::select! {
            result = api.get_updates(offset, config.telegram.poll_timeout_secs) => result,
            _ = cancel.cancelled() => {
                info!("Telegram poller cancelled");
                break;
            }
        };

        // Reap finished handlers so the set does not grow unbounded.
        while in_flight.try_join_next().is_some() {}

        match updates {
            Ok(updates) => {
                backoff_secs = 1;

                for update in updates {
                    // Advance offset to acknowledge this update
                    offset = Some(update.update_id + 1);

                    let Some(invocation) = update.message.and_then(into_invocation) else {
                        continue;
                    };
                    if !config.accepts_chat(invocation.chat_id.0) {
                        debug!(chat_id = invocation.chat_id.0, "ignoring message from unlisted chat");
                        continue;
                    }

                    let api = api.clone();
                    let dispatcher = Arc::clone(&dispatcher);
                    in_flight.spawn(async move {
                        let Some(reply) = dispatcher.handle(&invocation).await else {
                            return;
                        };
                        if let Err(e) = api.send_message(invocation.chat_id.0, &reply).await {
                            error!(chat_id = invocation.chat_id.0, error = %e, "failed to send reply");
                        }
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_secs, "getUpdates failed, backing off");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    _ = cancel.cancelled() => break,
                }
                backoff_secs = next_backoff(backoff_secs);
            }
        }
    }

    if !in_flight.is_empty() {
        info!(pending = in_flight.len(), "waiting for in-flight commands");
    }
    while in_flight.join_next().await.is_some() {}
    info!("Telegram poller stopped");
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

/// Text messages with a sender become invocations; everything else is dropped.
fn into_invocation(message: Message) -> Option<Invocation> {
    let text = message.text?;
    let user: ChatUser = message.from?.into();
    Some(Invocation {
        chat_id: ChatId(message.chat.id),
        user,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::types::{Chat, User};

    fn message(text: Option<&str>, from: bool) -> Message {
        Message {
            message_id: 1,
            from: from.then(|| User {
                id: 42,
                is_bot: false,
                first_name: "Bob".to_string(),
                username: Some("bob".to_string()),
            }),
            chat: Chat {
                id: -100,
                chat_type: Some("group".to_string()),
            },
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_backoff_doubles_up_to_a_minute() {
        let mut secs = 1;
        let mut seen = Vec::new();
        for _ in 0..8 {
            secs = next_backoff(secs);
            seen.push(secs);
        }
        assert_eq!(seen, vec![2, 4, 8, 16, 32, 60, 60, 60]);
    }

    #[test]
    fn test_text_message_becomes_invocation() {
        let invocation = into_invocation(message(Some("/services"), true)).unwrap();
        assert_eq!(invocation.chat_id, ChatId(-100));
        assert_eq!(invocation.user.identity(), "bob");
        assert_eq!(invocation.text, "/services");
    }

    #[test]
    fn test_non_text_or_anonymous_messages_are_dropped() {
        assert!(into_invocation(message(None, true)).is_none());
        assert!(into_invocation(message(Some("/services"), false)).is_none());
    }

    #[tokio::test]
    async fn test_cancelled_loop_returns_promptly() {
        use easyshare_core::service::checkout::CheckoutService;
        use easyshare_core::service::registry::RegistryService;
        use easyshare_core::command::BotProfile;
        use crate::sqlite::account::SqliteAccountRepository;
        use crate::sqlite::service::SqliteServiceRepository;
        use crate::sqlite::usage::SqliteUsageRepository;
        use crate::sqlite::test_support::test_pool;
        use secrecy::SecretString;

        let (_dir, pool) = test_pool().await;
        let api = TelegramApi::with_base_url(
            SecretString::from("1:x".to_string()),
            "http://127.0.0.1:9",
        );
        let dispatcher = Arc::new(CommandDispatcher::new(
            RegistryService::new(
                SqliteServiceRepository::new(pool.clone()),
                SqliteAccountRepository::new(pool.clone()),
            ),
            CheckoutService::new(
                SqliteAccountRepository::new(pool.clone()),
                SqliteUsageRepository::new(pool),
            ),
            api.clone(),
            BotProfile::default(),
        ));

        let cancel = CancellationToken::new();
        cancel.cancel();
        tokio::time::timeout(
            Duration::from_secs(5),
            poll_loop(api, dispatcher, &BotConfig::default(), cancel),
        )
        .await
        .unwrap();
    }
}
