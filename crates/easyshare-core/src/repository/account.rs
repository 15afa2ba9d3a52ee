//! Account repository trait definition, including the checkout transitions.

use chrono::{DateTime, Utc};
use easyshare_types::account::{Account, NewAccount, ServiceAccount};
use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;

/// Repository trait for account persistence and checkout state.
///
/// `claim` and `release` are the only state transitions of an account's
/// checkout columns. Each must run as a single transaction that also
/// maintains the usage ledger, so two concurrent claims of the same account
/// cannot both succeed.
pub trait AccountRepository: Send + Sync {
    /// Register an account under the named service.
    ///
    /// Returns `Ok(None)` when the service does not exist in the chat and
    /// `Conflict` when the username is already registered for it.
    fn create(
        &self,
        chat_id: ChatId,
        service_name: &str,
        account: &NewAccount,
    ) -> impl std::future::Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    fn find(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// All accounts of a service, ordered by username.
    fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Returns `false` if no account matched.
    fn update_password(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        password: &str,
        modified_by: &str,
        modified_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Returns `false` if no account matched.
    fn delete(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Accounts of a service that are currently claimed, ordered by username.
    fn list_claimed_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Accounts currently claimed by `user` anywhere in the chat,
    /// ordered by service name then username.
    fn list_claimed_by(
        &self,
        chat_id: ChatId,
        user: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ServiceAccount>, RepositoryError>> + Send;

    /// Claim an available account for `user` and open a usage row.
    ///
    /// Returns `false` (and changes nothing) when the account does not exist
    /// or is already claimed.
    fn claim(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Release an account held by `user` and close that user's open usage rows.
    ///
    /// Returns `false` (and changes nothing) when the account does not exist,
    /// is not claimed, or is claimed by somebody else.
    fn release(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Total number of accounts across all chats.
    fn count(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// Number of accounts currently claimed across all chats.
    fn count_claimed(
        &self,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
