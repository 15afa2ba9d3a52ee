//! SQLite usage-ledger repository.
//!
//! Rows are written by the account repository as part of claim/release;
//! this side is read-only.

use easyshare_core::repository::usage::UsageRepository;
use easyshare_types::account::AccountId;
use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;
use easyshare_types::service::ServiceId;
use easyshare_types::usage::{Usage, UsageId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{parse_datetime, parse_optional_datetime, query_error};

#[derive(Clone)]
pub struct SqliteUsageRepository {
    pool: DatabasePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Usage, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let account_id: Option<String> = row.try_get("account_id").map_err(query_error)?;
    let service_id: Option<String> = row.try_get("service_id").map_err(query_error)?;
    let started_at: String = row.try_get("started_at").map_err(query_error)?;

    Ok(Usage {
        id: id
            .parse::<UsageId>()
            .map_err(|e| RepositoryError::Query(format!("invalid usage id: {e}")))?,
        account_id: account_id
            .map(|s| s.parse::<AccountId>())
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid account id: {e}")))?,
        service_id: service_id
            .map(|s| s.parse::<ServiceId>())
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid service id: {e}")))?,
        chat_id: ChatId(row.try_get("chat_id").map_err(query_error)?),
        service_name: row.try_get("service_name").map_err(query_error)?,
        account_username: row.try_get("account_username").map_err(query_error)?,
        performed_by: row.try_get("performed_by").map_err(query_error)?,
        started_at: parse_datetime(&started_at)?,
        finished_at: parse_optional_datetime(row.try_get("finished_at").map_err(query_error)?)?,
    })
}

impl UsageRepository for SqliteUsageRepository {
    /// Usages recorded against the live service, including those of accounts
    /// since deleted. Rows of a deleted service never match a recreated one.
    async fn list_for_service(
        &self,
        chat_id: ChatId,
        service_name: &str,
    ) -> Result<Vec<Usage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT u.* FROM usages u
             JOIN services s ON s.id = u.service_id
             WHERE s.chat_id = ? AND s.name = ?
             ORDER BY u.started_at",
        )
        .bind(chat_id.0)
        .bind(service_name)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(map_row).collect()
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.0)
    }
}
