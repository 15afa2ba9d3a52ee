//! Application state wiring the repositories together.
//!
//! Services are generic over repository and platform traits; AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;

use easyshare_core::command::{BotProfile, CommandDispatcher};
use easyshare_core::service::checkout::CheckoutService;
use easyshare_core::service::registry::RegistryService;
use easyshare_infra::config::{load_bot_config, resolve_data_dir, validate_config};
use easyshare_infra::sqlite::account::SqliteAccountRepository;
use easyshare_infra::sqlite::pool::DatabasePool;
use easyshare_infra::sqlite::service::SqliteServiceRepository;
use easyshare_infra::sqlite::usage::SqliteUsageRepository;
use easyshare_infra::telegram::TelegramApi;
use easyshare_types::config::BotConfig;

/// Concrete dispatcher type pinned to SQLite and the Telegram API.
pub type ConcreteDispatcher = CommandDispatcher<
    SqliteServiceRepository,
    SqliteAccountRepository,
    SqliteUsageRepository,
    TelegramApi,
>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: BotConfig,
    pub db_pool: DatabasePool,
    pub service_repo: SqliteServiceRepository,
    pub account_repo: SqliteAccountRepository,
    pub usage_repo: SqliteUsageRepository,
}

impl AppState {
    /// Load the configuration without touching the database.
    pub async fn load_config() -> anyhow::Result<(PathBuf, BotConfig)> {
        let data_dir = resolve_data_dir();
        let config = load_bot_config(&data_dir).await;
        validate_config(&config)?;
        Ok((data_dir, config))
    }

    /// Initialize the application state: connect to DB, build repositories.
    pub async fn init(data_dir: PathBuf, config: BotConfig) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_path = data_dir.join(&config.database_file);
        let db_pool = DatabasePool::open(&db_path).await?;
        tracing::debug!(path = %db_path.display(), "database ready");

        Ok(Self {
            data_dir,
            config,
            service_repo: SqliteServiceRepository::new(db_pool.clone()),
            account_repo: SqliteAccountRepository::new(db_pool.clone()),
            usage_repo: SqliteUsageRepository::new(db_pool.clone()),
            db_pool,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.database_file)
    }

    /// Wire the command dispatcher for the given platform client.
    pub fn dispatcher(&self, api: TelegramApi, profile: BotProfile) -> ConcreteDispatcher {
        CommandDispatcher::new(
            RegistryService::new(self.service_repo.clone(), self.account_repo.clone()),
            CheckoutService::new(self.account_repo.clone(), self.usage_repo.clone()),
            api,
            profile,
        )
    }
}
