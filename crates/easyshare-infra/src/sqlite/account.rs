//! SQLite account repository implementation, including the claim/release
//! state machine.
//!
//! Claim and release run their guard check, the account update and the
//! usage-ledger write in a single writer transaction.

use chrono::{DateTime, Utc};
use easyshare_core::repository::account::AccountRepository;
use easyshare_types::account::{Account, AccountId, NewAccount, ServiceAccount};
use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;
use easyshare_types::service::ServiceId;
use easyshare_types::usage::UsageId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{conflict_or_query, format_datetime, parse_datetime, parse_optional_datetime, query_error};

/// Resolves `(chat_id, service_name, username)` to an account id.
const ACCOUNT_ID_BY_NAME: &str = "SELECT a.id FROM accounts a
     JOIN services s ON s.id = a.service_id
     WHERE s.chat_id = ? AND s.name = ? AND a.username = ?";

/// SQLite-backed implementation of `AccountRepository`.
#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: DatabasePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct AccountRow {
    id: String,
    service_id: String,
    username: String,
    password: String,
    created_by: String,
    created_at: String,
    grabbed_at: Option<String>,
    grabbed_by: Option<String>,
    released_at: Option<String>,
    last_modified_by: Option<String>,
    last_modified_at: Option<String>,
}

impl AccountRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            service_id: row.try_get("service_id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            grabbed_at: row.try_get("grabbed_at")?,
            grabbed_by: row.try_get("grabbed_by")?,
            released_at: row.try_get("released_at")?,
            last_modified_by: row.try_get("last_modified_by")?,
            last_modified_at: row.try_get("last_modified_at")?,
        })
    }

    fn into_account(self) -> Result<Account, RepositoryError> {
        let id = self
            .id
            .parse::<AccountId>()
            .map_err(|e| RepositoryError::Query(format!("invalid account id: {e}")))?;
        let service_id = self
            .service_id
            .parse::<ServiceId>()
            .map_err(|e| RepositoryError::Query(format!("invalid service id: {e}")))?;

        Ok(Account {
            id,
            service_id,
            username: self.username,
            password: self.password,
            created_by: self.created_by,
            created_at: parse_datetime(&self.created_at)?,
            grabbed_at: parse_optional_datetime(self.grabbed_at)?,
            grabbed_by: self.grabbed_by,
            released_at: parse_optional_datetime(self.released_at)?,
            last_modified_by: self.last_modified_by,
            last_modified_at: parse_optional_datetime(self.last_modified_at)?,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Account, RepositoryError> {
    AccountRow::from_row(row)
        .map_err(query_error)?
        .into_account()
}

impl AccountRepository for SqliteAccountRepository {
    async fn create(
        &self,
        chat_id: ChatId,
        service_name: &str,
        account: &NewAccount,
    ) -> Result<Option<Account>, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let service_id: Option<(String,)> =
            sqlx::query_as("SELECT id FROM services WHERE chat_id = ? AND name = ?")
                .bind(chat_id.0)
                .bind(service_name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(query_error)?;
        let Some((service_id,)) = service_id else {
            return Ok(None);
        };

        let created = Account {
            id: AccountId::new(),
            service_id: service_id
                .parse::<ServiceId>()
                .map_err(|e| RepositoryError::Query(format!("invalid service id: {e}")))?,
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

        sqlx::query(
            "INSERT INTO accounts (id, service_id, username, password, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id.to_string())
        .bind(&service_id)
        .bind(&created.username)
        .bind(&created.password)
        .bind(&created.created_by)
        .bind(format_datetime(&created.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            conflict_or_query(e, || {
                format!(
                    "account '{}' already exists for service '{service_name}'",
                    account.username
                )
            })
        })?;

        tx.commit().await.map_err(query_error)?;
        Ok(Some(created))
    }

    async fn find(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query(
            "SELECT a.* FROM accounts a
             JOIN services s ON s.id = a.service_id
             WHERE s.chat_id = ? AND s.name = ? AND a.username = ?",
        )
        .bind(chat_id.0)
        .bind(service_name)
        .bind(username)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT a.* FROM accounts a
             JOIN services s ON s.id = a.service_id
             WHERE s.chat_id = ? AND s.name = ?
             ORDER BY a.username",
        )
        .bind(chat_id.0)
        .bind(service_name)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(map_row).collect()
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
        let result = sqlx::query(&format!(
            "UPDATE accounts SET password = ?, last_modified_by = ?, last_modified_at = ?
             WHERE id = ({ACCOUNT_ID_BY_NAME})"
        ))
        .bind(password)
        .bind(modified_by)
        .bind(format_datetime(&modified_at))
        .bind(chat_id.0)
        .bind(service_name)
        .bind(username)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM accounts WHERE id = ({ACCOUNT_ID_BY_NAME})"))
            .bind(chat_id.0)
            .bind(service_name)
            .bind(username)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_claimed_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT a.* FROM accounts a
             JOIN services s ON s.id = a.service_id
             WHERE s.chat_id = ? AND s.name = ?
               AND a.grabbed_at IS NOT NULL AND a.released_at IS NULL
             ORDER BY a.username",
        )
        .bind(chat_id.0)
        .bind(service_name)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(map_row).collect()
    }

    async fn list_claimed_by(
        &self,
        chat_id: ChatId,
        user: &str,
    ) -> Result<Vec<ServiceAccount>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT a.*, s.name AS service_name FROM accounts a
             JOIN services s ON s.id = a.service_id
             WHERE s.chat_id = ? AND a.grabbed_by = ?
               AND a.grabbed_at IS NOT NULL AND a.released_at IS NULL
             ORDER BY s.name, a.username",
        )
        .bind(chat_id.0)
        .bind(user)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let service_name: String = row.try_get("service_name").map_err(query_error)?;
                Ok(ServiceAccount {
                    service_name,
                    account: map_row(row)?,
                })
            })
            .collect()
    }

    async fn claim(
        &self,
        chat_id: ChatId,
        service_name: &str,
        username: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let ids: Option<(String, String)> = sqlx::query_as(
            "SELECT a.id, a.service_id FROM accounts a
             JOIN services s ON s.id = a.service_id
             WHERE s.chat_id = ? AND s.name = ? AND a.username = ?",
        )
        .bind(chat_id.0)
        .bind(service_name)
        .bind(username)
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error)?;
        let Some((account_id, service_id)) = ids else {
            return Ok(false);
        };

        let updated = sqlx::query(
            "UPDATE accounts SET grabbed_at = ?, grabbed_by = ?, released_at = NULL
             WHERE id = ? AND (grabbed_at IS NULL OR released_at IS NOT NULL)",
        )
        .bind(format_datetime(&at))
        .bind(user)
        .bind(&account_id)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO usages (id, account_id, service_id, chat_id, service_name, account_username, performed_by, started_at, finished_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(UsageId::new().to_string())
        .bind(&account_id)
        .bind(&service_id)
        .bind(chat_id.0)
        .bind(service_name)
        .bind(username)
        .bind(user)
        .bind(format_datetime(&at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
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
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let account_id: Option<(String,)> = sqlx::query_as(ACCOUNT_ID_BY_NAME)
            .bind(chat_id.0)
            .bind(service_name)
            .bind(username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        let Some((account_id,)) = account_id else {
            return Ok(false);
        };

        let updated = sqlx::query(
            "UPDATE accounts SET released_at = ?
             WHERE id = ? AND grabbed_by = ? AND grabbed_at IS NOT NULL AND released_at IS NULL",
        )
        .bind(format_datetime(&at))
        .bind(&account_id)
        .bind(user)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE usages SET finished_at = ?
             WHERE account_id = ? AND performed_by = ? AND finished_at IS NULL",
        )
        .bind(format_datetime(&at))
        .bind(&account_id)
        .bind(user)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.0)
    }

    async fn count_claimed(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM accounts WHERE grabbed_at IS NOT NULL AND released_at IS NULL",
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;
        Ok(row.0)
    }
}
