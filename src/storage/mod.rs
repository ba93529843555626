use std::sync::Arc;

use async_trait::async_trait;
use strum::{AsRefStr, Display, EnumString};
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{Result, ShortUrlError};

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::{RelationalBackend, SeaOrmStorage};
pub use memory::LogBackedStorage;
pub use models::{BackendInfo, BatchUrl, BatchUrlItem, ShortUrl};

/// 短链接存储能力集合
///
/// 三种实现（追加日志内存存储、PostgreSQL、SQLite）提供相同的语义：
/// `original_url` 全局唯一，重复保存返回 `UrlConflict` 并带上已有的短码；
/// 查询不到时返回 `None`，不视为错误。
#[async_trait]
pub trait Storage: Send + Sync {
    async fn ping(&self) -> Result<()>;

    /// 保存一条新记录，返回分配的 id
    async fn save(&self, code: &str, original_url: &str, owner_id: &str) -> Result<i64>;

    /// 批量保存。已存在的 URL 解析为已有短码，不会因冲突中断整个批次。
    async fn save_batch(&self, items: &[BatchUrlItem], owner_id: &str) -> Result<Vec<BatchUrl>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>>;

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrl>>;

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>>;

    /// 软删除属于 `owner_id` 的短码，返回实际标记的条数
    async fn soft_delete(&self, codes: &[String], owner_id: &str) -> Result<u64>;

    async fn count_records(&self) -> Result<u64>;

    async fn count_distinct_owners(&self) -> Result<u64>;

    /// 短码是否已被占用（包括已删除的记录）
    async fn code_exists(&self, code: &str) -> Result<bool> {
        Ok(self.find_by_code(code).await?.is_some())
    }

    fn backend_info(&self) -> BackendInfo;
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Postgres,
    Sqlite,
}

/// 从 DSN 推断存储后端类型，空 DSN 使用内存存储
pub fn infer_backend_from_dsn(dsn: &str) -> Result<StorageKind> {
    let dsn = dsn.trim();
    if dsn.is_empty() {
        Ok(StorageKind::Memory)
    } else if dsn.starts_with("postgres://") || dsn.starts_with("postgresql://") {
        Ok(StorageKind::Postgres)
    } else if dsn.starts_with("sqlite:") || dsn == ":memory:" {
        Ok(StorageKind::Sqlite)
    } else if !dsn.contains("://") && (dsn.ends_with(".db") || dsn.ends_with(".sqlite")) {
        // 后缀规则只适用于不带 scheme 的文件路径
        Ok(StorageKind::Sqlite)
    } else {
        Err(ShortUrlError::storage_config(format!(
            "无法从 DSN 推断数据库类型: {}. 支持的格式: postgres://, postgresql://, sqlite://, *.db, *.sqlite",
            dsn
        )))
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &AppConfig) -> Result<Arc<dyn Storage>> {
        let dsn = config.storage.database_dsn.trim();
        let kind = infer_backend_from_dsn(dsn)?;

        let storage: Arc<dyn Storage> = match kind {
            StorageKind::Memory => Arc::new(LogBackedStorage::open(
                &config.storage.file_storage_path,
                config.storage.persist_deletes,
            )?),
            StorageKind::Postgres => Arc::new(
                SeaOrmStorage::connect(dsn, RelationalBackend::Postgres, &config.database).await?,
            ),
            StorageKind::Sqlite => Arc::new(
                SeaOrmStorage::connect(dsn, RelationalBackend::Sqlite, &config.database).await?,
            ),
        };

        info!("Storage backend selected: {}", kind);
        Ok(storage)
    }
}
