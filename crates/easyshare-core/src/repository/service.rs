//! Service repository trait definition.

use chrono::{DateTime, Utc};
use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;
use easyshare_types::service::Service;

/// Repository trait for service persistence.
///
/// Implementations live in easyshare-infra (e.g., SqliteServiceRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ServiceRepository: Send + Sync {
    /// Insert a new service. Fails with `Conflict` if the name is taken in the chat.
    fn create(
        &self,
        service: &Service,
    ) -> impl std::future::Future<Output = Result<Service, RepositoryError>> + Send;

    /// All services of a chat, ordered by name.
    fn list_by_chat(
        &self,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<Service>, RepositoryError>> + Send;

    /// Rename a service. Returns `false` if no service matched.
    fn rename(
        &self,
        chat_id: ChatId,
        name: &str,
        new_name: &str,
        modified_by: &str,
        modified_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a service and, by cascade, all of its accounts.
    /// Returns `false` if no service matched.
    fn delete(
        &self,
        chat_id: ChatId,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Total number of services across all chats.
    fn count(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
