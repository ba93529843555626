//! SeaORM storage backend
//!
//! PostgreSQL 和 SQLite 共用同一套实现，URL 与短码的唯一性由数据库唯一索引保证。

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortUrlError};
use crate::storage::{BackendInfo, BatchUrl, BatchUrlItem, ShortUrl, Storage};

pub use connection::{connect_postgres, connect_sqlite, is_in_memory_dsn, run_migrations};
pub use converters::{model_to_short_url, new_active_model};

/// 关系型后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalBackend {
    Postgres,
    Sqlite,
}

impl RelationalBackend {
    pub fn name(&self) -> &'static str {
        match self {
            RelationalBackend::Postgres => "postgres",
            RelationalBackend::Sqlite => "sqlite",
        }
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend: RelationalBackend,
    persistent: bool,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn connect(
        dsn: &str,
        backend: RelationalBackend,
        config: &DatabaseConfig,
    ) -> Result<Self> {
        if dsn.is_empty() {
            return Err(ShortUrlError::storage_config("数据库 DSN 未设置"));
        }

        let db = match backend {
            RelationalBackend::Sqlite => connect_sqlite(dsn, config).await?,
            RelationalBackend::Postgres => connect_postgres(dsn, config).await?,
        };
        run_migrations(&db).await?;

        info!("{} storage initialized", backend.name().to_uppercase());
        Ok(Self {
            db,
            backend,
            persistent: !is_in_memory_dsn(dsn),
            retry_config: retry::RetryConfig::from(config),
        })
    }

    pub fn backend(&self) -> RelationalBackend {
        self.backend
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn ping(&self) -> Result<()> {
        self.ping_db().await
    }

    async fn save(&self, code: &str, original_url: &str, owner_id: &str) -> Result<i64> {
        self.insert_one(code, original_url, owner_id).await
    }

    async fn save_batch(&self, items: &[BatchUrlItem], owner_id: &str) -> Result<Vec<BatchUrl>> {
        self.insert_batch(items, owner_id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        self.fetch_by_code(code).await
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrl>> {
        self.fetch_by_url(original_url).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>> {
        self.fetch_by_owner(owner_id).await
    }

    async fn soft_delete(&self, codes: &[String], owner_id: &str) -> Result<u64> {
        self.mark_deleted(codes, owner_id).await
    }

    async fn count_records(&self) -> Result<u64> {
        self.count_all().await
    }

    async fn count_distinct_owners(&self) -> Result<u64> {
        self.count_owners().await
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            storage_type: self.backend.name().to_string(),
            persistent: self.persistent,
        }
    }
}
