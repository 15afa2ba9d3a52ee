//! Usage ledger repository trait definition.
//!
//! Usage rows are written by `AccountRepository::claim`/`release`; this
//! trait only reads them.

use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;
use easyshare_types::usage::Usage;

pub trait UsageRepository: Send + Sync {
    /// Usage history of a service, oldest first, including rows of
    /// accounts deleted from it.
    fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Usage>, RepositoryError>> + Send;

    /// Total number of usage rows, including orphaned history.
    fn count(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
