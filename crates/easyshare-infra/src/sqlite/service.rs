//! SQLite service repository implementation.
//!
//! Implements `ServiceRepository` from `easyshare-core` using sqlx with split read/write pools.

use chrono::{DateTime, Utc};
use easyshare_core::repository::service::ServiceRepository;
use easyshare_types::chat::ChatId;
use easyshare_types::error::RepositoryError;
use easyshare_types::service::{Service, ServiceId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{conflict_or_query, format_datetime, parse_datetime, parse_optional_datetime, query_error};

/// SQLite-backed implementation of `ServiceRepository`.
#[derive(Clone)]
pub struct SqliteServiceRepository {
    pool: DatabasePool,
}

impl SqliteServiceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ServiceRow {
    id: String,
    chat_id: i64,
    name: String,
    url: Option<String>,
    created_by: String,
    created_at: String,
    last_modified_by: Option<String>,
    last_modified_at: Option<String>,
}

impl ServiceRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            name: row.try_get("name")?,
            url: row.try_get("url")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            last_modified_by: row.try_get("last_modified_by")?,
            last_modified_at: row.try_get("last_modified_at")?,
        })
    }

    fn into_service(self) -> Result<Service, RepositoryError> {
        let id = self
            .id
            .parse::<ServiceId>()
            .map_err(|e| RepositoryError::Query(format!("invalid service id: {e}")))?;

        Ok(Service {
            id,
            chat_id: ChatId(self.chat_id),
            name: self.name,
            url: self.url,
            created_by: self.created_by,
            created_at: parse_datetime(&self.created_at)?,
            last_modified_by: self.last_modified_by,
            last_modified_at: parse_optional_datetime(self.last_modified_at)?,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Service, RepositoryError> {
    ServiceRow::from_row(row)
        .map_err(query_error)?
        .into_service()
}

impl ServiceRepository for SqliteServiceRepository {
    async fn create(&self, service: &Service) -> Result<Service, RepositoryError> {
        sqlx::query(
            "INSERT INTO services (id, chat_id, name, url, created_by, created_at, last_modified_by, last_modified_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(service.id.to_string())
        .bind(service.chat_id.0)
        .bind(&service.name)
        .bind(&service.url)
        .bind(&service.created_by)
        .bind(format_datetime(&service.created_at))
        .bind(&service.last_modified_by)
        .bind(service.last_modified_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| conflict_or_query(e, || format!("service '{}' already exists", service.name)))?;

        Ok(service.clone())
    }

    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM services WHERE chat_id = ? ORDER BY name")
            .bind(chat_id.0)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(map_row).collect()
    }

    async fn rename(
        &self,
        chat_id: ChatId,
        name: &str,
        new_name: &str,
        modified_by: &str,
        modified_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE services SET name = ?, last_modified_by = ?, last_modified_at = ?
             WHERE chat_id = ? AND name = ?",
        )
        .bind(new_name)
        .bind(modified_by)
        .bind(format_datetime(&modified_at))
        .bind(chat_id.0)
        .bind(name)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| conflict_or_query(e, || format!("service '{new_name}' already exists")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, chat_id: ChatId, name: &str) -> Result<bool, RepositoryError> {
        // Accounts cascade; their usages keep a NULL account_id.
        let result = sqlx::query("DELETE FROM services WHERE chat_id = ? AND name = ?")
            .bind(chat_id.0)
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.0)
    }
}
