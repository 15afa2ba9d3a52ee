//! Checkout engine: claiming and releasing shared accounts.
//!
//! An account has at most one active claim. `claim` succeeds only on an
//! available account and `release` only for the current holder; both are
//! delegated to the repository so the state change and the usage-ledger
//! write commit as one unit.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use easyshare_types::account::{Account, ServiceAccount};
use easyshare_types::chat::{ChatId, ChatUser};
use easyshare_types::error::RepositoryError;
use easyshare_types::usage::Usage;
use tracing::info;

use crate::repository::account::AccountRepository;
use crate::repository::usage::UsageRepository;

/// Accumulated claim time of one user on one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub performer: String,
    pub total: Duration,
    /// Number of claim periods, including any still open.
    pub sessions: usize,
}

/// Service owning the claim/release state machine and its read-only views.
///
/// Generic over `AccountRepository` and `UsageRepository` to maintain
/// clean architecture (easyshare-core never depends on easyshare-infra).
pub struct CheckoutService<A: AccountRepository, U: UsageRepository> {
    account_repo: A,
    usage_repo: U,
}

impl<A: AccountRepository, U: UsageRepository> CheckoutService<A, U> {
    pub fn new(account_repo: A, usage_repo: U) -> Self {
        Self {
            account_repo,
            usage_repo,
        }
    }

    /// Claim an account for `user`.
    ///
    /// Returns `false` both when the account does not exist and when it is
    /// already claimed; callers must not tell the two apart.
    pub async fn claim(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &ChatUser,
    ) -> Result<bool, RepositoryError> {
        let claimed = self
            .account_repo
            .claim(chat_id, service_name, username, &user.identity(), Utc::now())
            .await?;

        if claimed {
            info!(
                chat_id = chat_id.0,
                service = service_name,
                account = username,
                user = %user.identity(),
                "account claimed"
            );
        }
        Ok(claimed)
    }

    /// Release an account held by `user`.
    ///
    /// Returns `false` when the account does not exist, is not claimed, or
    /// is held by somebody else.
    pub async fn release(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &ChatUser,
    ) -> Result<bool, RepositoryError> {
        let released = self
            .account_repo
            .release(chat_id, service_name, username, &user.identity(), Utc::now())
            .await?;

        if released {
            info!(
                chat_id = chat_id.0,
                service = service_name,
                account = username,
                user = %user.identity(),
                "account released"
            );
        }
        Ok(released)
    }

    /// Accounts of a service that are currently claimed.
    pub async fn check(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        self.account_repo
            .list_claimed_for_service(chat_id, service_name)
            .await
    }

    /// Every account of a service; availability is derived per account.
    pub async fn status(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        self.account_repo.list_for_service(chat_id, service_name).await
    }

    /// Accounts currently claimed by `user` across all services of the chat.
    pub async fn status_for(
        &self,
        chat_id: ChatId,
        user: &ChatUser,
    ) -> Result<Vec<ServiceAccount>, RepositoryError> {
        self.account_repo
            .list_claimed_by(chat_id, &user.identity())
            .await
    }

    /// Total claimed time per user on a service, longest first.
    pub async fn ranking(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<RankingEntry>, RepositoryError> {
        let usages = self
            .usage_repo
            .list_for_service(chat_id, service_name)
            .await?;
        Ok(rank_usages(&usages, Utc::now()))
    }
}

/// Aggregate usage rows into a ranking as of `now`.
///
/// Open rows count up to `now`, so an ongoing claim keeps climbing the
/// ranking until it is released. Ties are broken by performer name.
pub fn rank_usages(usages: &[Usage], now: DateTime<Utc>) -> Vec<RankingEntry> {
    let mut totals: HashMap<&str, (Duration, usize)> = HashMap::new();
    for usage in usages {
        let entry = totals
            .entry(usage.performed_by.as_str())
            .or_insert((Duration::zero(), 0));
        entry.0 += usage.duration_until(now);
        entry.1 += 1;
    }

    let mut ranking: Vec<RankingEntry> = totals
        .into_iter()
        .map(|(performer, (total, sessions))| RankingEntry {
            performer: performer.to_string(),
            total,
            sessions,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.performer.cmp(&b.performer))
    });
    ranking
}
