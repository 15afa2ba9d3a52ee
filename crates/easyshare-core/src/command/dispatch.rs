//! Command dispatch: parse, check arity, authorize, execute, reply.
//!
//! Transport agnostic. The Telegram poller hands every incoming text message
//! to [`CommandDispatcher::handle`] and sends back whatever reply it gets.

use chrono::Utc;
use easyshare_types::chat::{ChatId, ChatUser};
use easyshare_types::error::{PlatformError, RepositoryError};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::parse::{Command, ParseError, parse_command};
use super::reply;
use crate::auth::{Authorization, authorize_admin};
use crate::platform::ChatPlatform;
use crate::repository::account::AccountRepository;
use crate::repository::service::ServiceRepository;
use crate::repository::usage::UsageRepository;
use crate::service::checkout::CheckoutService;
use crate::service::registry::RegistryService;

/// How the bot presents itself in help text and `/cmd@bot` addressing.
#[derive(Debug, Clone, Default)]
pub struct BotProfile {
    pub name: String,
    pub username: Option<String>,
}

/// One incoming text message.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub chat_id: ChatId,
    pub user: ChatUser,
    pub text: String,
}

#[derive(Debug, Error)]
enum CommandFailure {
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

pub struct CommandDispatcher<S, A, U, P>
where
    S: ServiceRepository,
    A: AccountRepository,
    U: UsageRepository,
    P: ChatPlatform,
{
    registry: RegistryService<S, A>,
    checkout: CheckoutService<A, U>,
    platform: P,
    profile: BotProfile,
}

impl<S, A, U, P> CommandDispatcher<S, A, U, P>
where
    S: ServiceRepository,
    A: AccountRepository,
    U: UsageRepository,
    P: ChatPlatform,
{
    pub fn new(
        registry: RegistryService<S, A>,
        checkout: CheckoutService<A, U>,
        platform: P,
        profile: BotProfile,
    ) -> Self {
        Self {
            registry,
            checkout,
            platform,
            profile,
        }
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    /// Handle one message. `None` means the message is not for this bot
    /// and must be ignored silently.
    pub async fn handle(&self, invocation: &Invocation) -> Option<String> {
        let command = match parse_command(&invocation.text, self.profile.username.as_deref()) {
            Ok(command) => command,
            Err(ParseError::Usage(kind)) => return Some(kind.usage()),
            Err(err) => {
                debug!(chat_id = invocation.chat_id.0, reason = ?err, "ignoring message");
                return None;
            }
        };

        let kind = command.kind();
        debug!(
            chat_id = invocation.chat_id.0,
            user = %invocation.user.identity(),
            command = %kind,
            "handling command"
        );
        if kind.requires_admin() {
            match authorize_admin(&self.platform, invocation.chat_id, &invocation.user).await {
                Ok(Authorization::Granted) => {}
                Ok(Authorization::Denied { status }) => {
                    warn!(
                        chat_id = invocation.chat_id.0,
                        user = %invocation.user.identity(),
                        command = %kind,
                        %status,
                        "privileged command denied"
                    );
                    return Some(reply::PERMISSION_DENIED.to_string());
                }
                Err(err) => {
                    error!(chat_id = invocation.chat_id.0, command = %kind, error = %err, "authorization failed");
                    return Some(reply::INTERNAL_ERROR.to_string());
                }
            }
        }

        match self.execute(command, invocation).await {
            Ok(text) => Some(text),
            Err(err) => {
                error!(chat_id = invocation.chat_id.0, command = %kind, error = %err, "command failed");
                Some(reply::INTERNAL_ERROR.to_string())
            }
        }
    }

    async fn execute(
        &self,
        command: Command,
        invocation: &Invocation,
    ) -> Result<String, CommandFailure> {
        let chat = invocation.chat_id;
        let user = &invocation.user;

        let text = match command {
            Command::Start => reply::start(),
            Command::Help => reply::help(&user.mention(), &self.profile.name),
            Command::Services => reply::services(&self.registry.list_services(chat).await?),
            Command::Status { service } => {
                let accounts = self.checkout.status(chat, &service).await?;
                reply::status(&service, &accounts, Utc::now())
            }
            Command::StatusMe => reply::status_me(&self.checkout.status_for(chat, user).await?),
            Command::CreateService { name } => {
                match self.registry.create_service(chat, &name, user).await {
                    Ok(_) => reply::service_created(&name),
                    Err(RepositoryError::Conflict(_)) => reply::service_exists(&name),
                    Err(err) => return Err(err.into()),
                }
            }
            Command::UpdateService { name, new_name } => {
                match self.registry.rename_service(chat, &name, &new_name, user).await {
                    Ok(true) => reply::service_updated(),
                    Ok(false) => reply::SERVICE_NOT_FOUND.to_string(),
                    Err(RepositoryError::Conflict(_)) => reply::service_exists(&new_name),
                    Err(err) => return Err(err.into()),
                }
            }
            Command::DeleteService { name } => {
                if self.registry.delete_service(chat, &name).await? {
                    reply::service_deleted()
                } else {
                    reply::SERVICE_NOT_FOUND.to_string()
                }
            }
            Command::Check { service } => {
                reply::check(&service, &self.checkout.check(chat, &service).await?)
            }
            Command::Accounts { service } => {
                reply::accounts(&service, &self.registry.list_accounts(chat, &service).await?)
            }
            Command::CreateAccount {
                service,
                username,
                password,
            } => match self
                .registry
                .create_account(chat, &service, &username, &password, user)
                .await
            {
                Ok(Some(_)) => reply::account_created(&service, &username),
                Ok(None) => reply::SERVICE_NOT_FOUND.to_string(),
                Err(RepositoryError::Conflict(_)) => reply::account_exists(&service, &username),
                Err(err) => return Err(err.into()),
            },
            Command::UpdateAccount {
                service,
                username,
                password,
            } => {
                if self
                    .registry
                    .update_account_password(chat, &service, &username, &password, user)
                    .await?
                {
                    reply::account_updated()
                } else {
                    reply::service_or_account_not_found()
                }
            }
            Command::DeleteAccount { service, username } => {
                if self.registry.delete_account(chat, &service, &username).await? {
                    reply::account_deleted()
                } else {
                    reply::ACCOUNT_NOT_FOUND.to_string()
                }
            }
            Command::Use { service, username } => {
                if self.checkout.claim(chat, &service, &username, user).await? {
                    reply::claimed(&service, &username)
                } else {
                    reply::claim_failed()
                }
            }
            Command::Release { service, username } => {
                if self.checkout.release(chat, &service, &username, user).await? {
                    reply::released()
                } else {
                    reply::release_failed()
                }
            }
            Command::ReportBroken { service, username } => {
                if self
                    .registry
                    .find_account(chat, &service, &username)
                    .await?
                    .is_none()
                {
                    reply::ACCOUNT_NOT_FOUND.to_string()
                } else {
                    let admins = self.platform.administrators(chat).await?;
                    warn!(chat_id = chat.0, service = %service, account = %username, "account reported broken");
                    reply::broken_report(&service, &username, &user.mention(), &admins)
                }
            }
            Command::Ranking { service } => {
                reply::ranking(&service, &self.checkout.ranking(chat, &service).await?)
            }
        };
        Ok(text)
    }
}
