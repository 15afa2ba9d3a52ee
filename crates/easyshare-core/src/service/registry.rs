//! Service and account administration.
//!
//! Plain create/rename/delete for services and create/update/delete for
//! accounts, keyed by name within a chat. Authorization is the caller's
//! job; this service only records who made each change.

use chrono::Utc;
use easyshare_types::account::{Account, NewAccount};
use easyshare_types::chat::{ChatId, ChatUser};
use easyshare_types::error::RepositoryError;
use easyshare_types::service::Service;
use tracing::info;

use crate::repository::account::AccountRepository;
use crate::repository::service::ServiceRepository;

pub struct RegistryService<S: ServiceRepository, A: AccountRepository> {
    service_repo: S,
    account_repo: A,
}

impl<S: ServiceRepository, A: AccountRepository> RegistryService<S, A> {
    pub fn new(service_repo: S, account_repo: A) -> Self {
        Self {
            service_repo,
            account_repo,
        }
    }

    // --- Services ---

    pub async fn list_services(&self, chat_id: ChatId) -> Result<Vec<Service>, RepositoryError> {
        self.service_repo.list_by_chat(chat_id).await
    }

    /// Register a service. Fails with `Conflict` if the name is taken.
    pub async fn create_service(
        &self,
        chat_id: ChatId,
        name: &str,
        user: &ChatUser,
    ) -> Result<Service, RepositoryError> {
        let service = self
            .service_repo
            .create(&Service::new(chat_id, name, user.identity()))
            .await?;
        info!(chat_id = chat_id.0, service = name, by = %user.identity(), "service created");
        Ok(service)
    }

    /// Rename a service. `Ok(false)` if it does not exist.
    pub async fn rename_service(
        &self,
        chat_id: ChatId,
        name: &str,
        new_name: &str,
        user: &ChatUser,
    ) -> Result<bool, RepositoryError> {
        let renamed = self
            .service_repo
            .rename(chat_id, name, new_name, &user.identity(), Utc::now())
            .await?;
        if renamed {
            info!(chat_id = chat_id.0, service = name, new_name, "service renamed");
        }
        Ok(renamed)
    }

    /// Delete a service together with its accounts. `Ok(false)` if it does not exist.
    pub async fn delete_service(&self, chat_id: ChatId, name: &str) -> Result<bool, RepositoryError> {
        let deleted = self.service_repo.delete(chat_id, name).await?;
        if deleted {
            info!(chat_id = chat_id.0, service = name, "service deleted");
        }
        Ok(deleted)
    }

    // --- Accounts ---

    pub async fn list_accounts(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        self.account_repo.list_for_service(chat_id, service_name).await
    }

    pub async fn find_account(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        self.account_repo.find(chat_id, service_name, username).await
    }

    /// Register an account. `Ok(None)` if the service does not exist,
    /// `Conflict` if the username is already registered for it.
    pub async fn create_account(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        password: &str,
        user: &ChatUser,
    ) -> Result<Option<Account>, RepositoryError> {
        let new_account = NewAccount {
            username: username.to_string(),
            password: password.to_string(),
            created_by: user.identity(),
        };
        let created = self
            .account_repo
            .create(chat_id, service_name, &new_account)
            .await?;
        if created.is_some() {
            info!(chat_id = chat_id.0, service = service_name, account = username, "account created");
        }
        Ok(created)
    }

    pub async fn update_account_password(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        password: &str,
        user: &ChatUser,
    ) -> Result<bool, RepositoryError> {
        self.account_repo
            .update_password(
                chat_id,
                service_name,
                username,
                password,
                &user.identity(),
                Utc::now(),
            )
            .await
    }

    pub async fn delete_account(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        let deleted = self
            .account_repo
            .delete(chat_id, service_name, username)
            .await?;
        if deleted {
            info!(chat_id = chat_id.0, service = service_name, account = username, "account deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, user};

    const CHAT: ChatId = ChatId(-100);

    fn registry() -> RegistryService<InMemoryStore, InMemoryStore> {
        let store = InMemoryStore::new();
        RegistryService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_create_and_list_services_sorted() {
        let registry = registry();
        let admin = user(1, "admin");

        registry.create_service(CHAT, "Spotify", &admin).await.unwrap();
        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();
        registry.create_service(ChatId(7), "Hulu", &admin).await.unwrap();

        let names: Vec<String> = registry
            .list_services(CHAT)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Netflix", "Spotify"]);
    }

    #[tokio::test]
    async fn test_duplicate_service_conflicts_within_chat_only() {
        let registry = registry();
        let admin = user(1, "admin");

        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();
        let err = registry
            .create_service(CHAT, "Netflix", &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        registry
            .create_service(ChatId(7), "Netflix", &admin)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rename_records_modifier() {
        let registry = registry();
        let admin = user(1, "admin");
        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();

        assert!(
            registry
                .rename_service(CHAT, "Netflix", "NetflixHD", &user(2, "other"))
                .await
                .unwrap()
        );
        assert!(
            !registry
                .rename_service(CHAT, "Netflix", "Again", &admin)
                .await
                .unwrap()
        );

        let services = registry.list_services(CHAT).await.unwrap();
        assert_eq!(services[0].name, "NetflixHD");
        assert_eq!(services[0].last_modified_by.as_deref(), Some("other"));
        assert!(services[0].last_modified_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_service_cascades_accounts() {
        let registry = registry();
        let admin = user(1, "admin");
        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();
        registry
            .create_account(CHAT, "Netflix", "u1", "p1", &admin)
            .await
            .unwrap();

        assert!(registry.delete_service(CHAT, "Netflix").await.unwrap());
        assert!(!registry.delete_service(CHAT, "Netflix").await.unwrap());

        let found = registry.find_account(CHAT, "Netflix", "u1").await.unwrap();
        assert!(found.is_none());

        // Recreating the service does not resurrect the old accounts.
        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();
        assert!(registry.list_accounts(CHAT, "Netflix").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_account_requires_service() {
        let registry = registry();
        let admin = user(1, "admin");

        let created = registry
            .create_account(CHAT, "Netflix", "u1", "p1", &admin)
            .await
            .unwrap();
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_account_lifecycle() {
        let registry = registry();
        let admin = user(1, "admin");
        registry.create_service(CHAT, "Netflix", &admin).await.unwrap();

        let account = registry
            .create_account(CHAT, "Netflix", "u1", "p1", &admin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.created_by, "admin");

        let dup = registry
            .create_account(CHAT, "Netflix", "u1", "other", &admin)
            .await
            .unwrap_err();
        assert!(matches!(dup, RepositoryError::Conflict(_)));

        assert!(
            registry
                .update_account_password(CHAT, "Netflix", "u1", "p2", &admin)
                .await
                .unwrap()
        );
        let updated = registry
            .find_account(CHAT, "Netflix", "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password, "p2");
        assert_eq!(updated.last_modified_by.as_deref(), Some("admin"));

        assert!(registry.delete_account(CHAT, "Netflix", "u1").await.unwrap());
        assert!(!registry.delete_account(CHAT, "Netflix", "u1").await.unwrap());
        assert!(
            !registry
                .update_account_password(CHAT, "Netflix", "u1", "p3", &admin)
                .await
                .unwrap()
        );
    }
}
