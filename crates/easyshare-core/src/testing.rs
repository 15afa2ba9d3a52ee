//! In-memory repositories and a scripted chat platform for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use easyshare_types::account::{Account, AccountId, NewAccount, ServiceAccount};
use easyshare_types::chat::{ChatId, ChatMember, ChatUser, MemberStatus};
use easyshare_types::error::{PlatformError, RepositoryError};
use easyshare_types::service::Service;
use easyshare_types::usage::{Usage, UsageId};

use crate::platform::ChatPlatform;
use crate::repository::account::AccountRepository;
use crate::repository::service::ServiceRepository;
use crate::repository::usage::UsageRepository;

pub fn user(id: i64, username: &str) -> ChatUser {
    ChatUser {
        id,
        username: Some(username.to_string()),
        first_name: username.to_string(),
        is_bot: false,
    }
}

#[derive(Default)]
struct State {
    services: Vec<Service>,
    accounts: Vec<Account>,
    usages: Vec<Usage>,
}

impl State {
    fn service(&self, chat_id: ChatId, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.chat_id == chat_id && s.name == name)
    }

    fn account_index(&self, chat_id: ChatId, service_name: &str, username: &str) -> Option<usize> {
        let service_id = self.service(chat_id, service_name)?.id;
        self.accounts
            .iter()
            .position(|a| a.service_id == service_id && a.username == username)
    }

    fn accounts_of(&self, chat_id: ChatId, service_name: &str) -> Vec<Account> {
        let Some(service) = self.service(chat_id, service_name) else {
            return Vec::new();
        };
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.service_id == service.id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }
}

/// Shared in-memory store implementing all three repository traits.
///
/// Clones share state, so one store can back both the registry and the
/// checkout service. Every trait call bumps an operation counter.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    operations: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls made so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Make every subsequent trait call fail with `RepositoryError::Query`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn usages(&self) -> Vec<Usage> {
        self.state.lock().unwrap().usages.clone()
    }

    pub fn insert_usage(&self, usage: Usage) {
        self.state.lock().unwrap().usages.push(usage);
    }

    fn touch(&self) -> Result<(), RepositoryError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("database is locked".to_string()));
        }
        Ok(())
    }
}

impl ServiceRepository for InMemoryStore {
    async fn create(&self, service: &Service) -> Result<Service, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        if state.service(service.chat_id, &service.name).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "service '{}' already exists",
                service.name
            )));
        }
        state.services.push(service.clone());
        Ok(service.clone())
    }

    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<Service>, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        let mut services: Vec<Service> = state
            .services
            .iter()
            .filter(|s| s.chat_id == chat_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn rename(
        &self,
        chat_id: ChatId,
        name: &str,
        new_name: &str,
        modified_by: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        if name != new_name && state.service(chat_id, new_name).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "service '{new_name}' already exists"
            )));
        }
        match state
            .services
            .iter_mut()
            .find(|s| s.chat_id == chat_id && s.name == name)
        {
            Some(service) => {
                service.name = new_name.to_string();
                service.last_modified_by = Some(modified_by.to_string());
                service.last_modified_at = Some(modified_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, chat_id: ChatId, name: &str) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(service_id) = state.service(chat_id, name).map(|s| s.id) else {
            return Ok(false);
        };
        let removed: Vec<AccountId> = state
            .accounts
            .iter()
            .filter(|a| a.service_id == service_id)
            .map(|a| a.id)
            .collect();
        state.accounts.retain(|a| a.service_id != service_id);
        state.services.retain(|s| s.id != service_id);
        for usage in state.usages.iter_mut() {
            if usage.account_id.is_some_and(|id| removed.contains(&id)) {
                usage.account_id = None;
            }
            if usage.service_id == Some(service_id) {
                usage.service_id = None;
            }
        }
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.touch()?;
        Ok(self.state.lock().unwrap().services.len() as i64)
    }
}

impl AccountRepository for InMemoryStore {
    async fn create(
        &self,
        chat_id: ChatId,
        service_name: &str,
        account: &NewAccount,
    ) -> Result<Option<Account>, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(service_id) = state.service(chat_id, service_name).map(|s| s.id) else {
            return Ok(None);
        };
        if state.account_index(chat_id, service_name, &account.username).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "account '{}' already exists",
                account.username
            )));
        }
        let created = Account {
            id: AccountId::new(),
            service_id,
            username: account.username.clone(),
            password: account.password.clone(),
            created_by: account.created_by.clone(),
            created_at: Utc::now(),
            grabbed_at: None,
            grabbed_by: None,
            released_at: None,
            last_modified_by: None,
            last_modified_at: None,
        };
        state.accounts.push(created.clone());
        Ok(Some(created))
    }

    async fn find(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .account_index(chat_id, service_name, username)
            .map(|i| state.accounts[i].clone()))
    }

    async fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        self.touch()?;
        Ok(self.state.lock().unwrap().accounts_of(chat_id, service_name))
    }

    async fn update_password(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        password: &str,
        modified_by: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(i) = state.account_index(chat_id, service_name, username) else {
            return Ok(false);
        };
        let account = &mut state.accounts[i];
        account.password = password.to_string();
        account.last_modified_by = Some(modified_by.to_string());
        account.last_modified_at = Some(modified_at);
        Ok(true)
    }

    async fn delete(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(i) = state.account_index(chat_id, service_name, username) else {
            return Ok(false);
        };
        let removed = state.accounts.remove(i);
        for usage in state.usages.iter_mut() {
            if usage.account_id == Some(removed.id) {
                usage.account_id = None;
            }
        }
        Ok(true)
    }

    async fn list_claimed_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts_of(chat_id, service_name)
            .into_iter()
            .filter(|a| !a.is_available())
            .collect())
    }

    async fn list_claimed_by(
        &self,
        chat_id: ChatId,
        user: &str,
    ) -> Result<Vec<ServiceAccount>, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        let mut claimed: Vec<ServiceAccount> = state
            .services
            .iter()
            .filter(|s| s.chat_id == chat_id)
            .flat_map(|s| {
                state
                    .accounts
                    .iter()
                    .filter(move |a| a.service_id == s.id && a.holder() == Some(user))
                    .map(move |a| ServiceAccount {
                        service_name: s.name.clone(),
                        account: a.clone(),
                    })
            })
            .collect();
        claimed.sort_by(|a, b| {
            (&a.service_name, &a.account.username).cmp(&(&b.service_name, &b.account.username))
        });
        Ok(claimed)
    }

    async fn claim(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(i) = state.account_index(chat_id, service_name, username) else {
            return Ok(false);
        };
        if !state.accounts[i].is_available() {
            return Ok(false);
        }
        let account = &mut state.accounts[i];
        account.grabbed_at = Some(at);
        account.grabbed_by = Some(user.to_string());
        account.released_at = None;
        let usage = Usage {
            id: UsageId::new(),
            account_id: Some(account.id),
            service_id: Some(account.service_id),
            chat_id,
            service_name: service_name.to_string(),
            account_username: username.to_string(),
            performed_by: user.to_string(),
            started_at: at,
            finished_at: None,
        };
        state.usages.push(usage);
        Ok(true)
    }

    async fn release(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.touch()?;
        let mut state = self.state.lock().unwrap();
        let Some(i) = state.account_index(chat_id, service_name, username) else {
            return Ok(false);
        };
        if state.accounts[i].holder() != Some(user) {
            return Ok(false);
        }
        state.accounts[i].released_at = Some(at);
        let account_id = state.accounts[i].id;
        for usage in state.usages.iter_mut() {
            if usage.account_id == Some(account_id) && usage.performed_by == user && usage.is_open()
            {
                usage.finished_at = Some(at);
            }
        }
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.touch()?;
        Ok(self.state.lock().unwrap().accounts.len() as i64)
    }

    async fn count_claimed(&self) -> Result<i64, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().filter(|a| !a.is_available()).count() as i64)
    }
}

impl UsageRepository for InMemoryStore {
    async fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Usage>, RepositoryError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        let Some(service_id) = state.service(chat_id, service_name).map(|s| s.id) else {
            return Ok(Vec::new());
        };
        let mut usages: Vec<Usage> = state
            .usages
            .iter()
            .filter(|u| u.service_id == Some(service_id))
            .cloned()
            .collect();
        usages.sort_by_key(|u| u.started_at);
        Ok(usages)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.touch()?;
        Ok(self.state.lock().unwrap().usages.len() as i64)
    }
}

/// Scripted chat platform. Users not registered in a chat are plain members.
#[derive(Default)]
pub struct MockPlatform {
    members: HashMap<(i64, i64), ChatMember>,
    failing: bool,
    calls: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, chat_id: ChatId, user_id: i64, status: MemberStatus) -> Self {
        self.with_user(chat_id, user(user_id, &format!("user{user_id}")), status)
    }

    pub fn with_user(mut self, chat_id: ChatId, user: ChatUser, status: MemberStatus) -> Self {
        self.members
            .insert((chat_id.0, user.id), ChatMember { user, status });
        self
    }

    /// Make every platform call fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatPlatform for MockPlatform {
    async fn member_status(
        &self,
        chat_id: ChatId,
        user_id: i64,
    ) -> Result<MemberStatus, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(PlatformError::Api("Bad Request: chat not found".to_string()));
        }
        Ok(self
            .members
            .get(&(chat_id.0, user_id))
            .map(|m| m.status)
            .unwrap_or(MemberStatus::Member))
    }

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(PlatformError::Api("Bad Request: chat not found".to_string()));
        }
        let mut admins: Vec<ChatMember> = self
            .members
            .iter()
            .filter(|((chat, _), m)| *chat == chat_id.0 && m.status.is_privileged())
            .map(|(_, m)| m.clone())
            .collect();
        admins.sort_by_key(|m| m.user.id);
        Ok(admins)
    }
}
