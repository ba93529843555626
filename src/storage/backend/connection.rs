use std::str::FromStr;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortUrlError};
use migration::{Migrator, MigratorTrait};

/// DSN 是否指向 SQLite 内存库（进程退出后数据不保留）
pub fn is_in_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// 连接 SQLite 数据库（自动创建文件，开启 WAL）
pub async fn connect_sqlite(dsn: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    };

    let opt = SqliteConnectOptions::from_str(dsn)
        .map_err(|e| ShortUrlError::storage_config(format!("SQLite DSN 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let mut pool_opts =
        SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.timeout));
    pool_opts = if is_in_memory_dsn(dsn) {
        // 内存库随最后一个连接关闭而消失：固定一个永不回收的连接
        pool_opts
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_opts.max_connections(config.pool_size.max(1))
    };

    let pool = pool_opts
        .connect_with(opt)
        .await
        .map_err(|e| {
            ShortUrlError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 PostgreSQL 数据库
pub async fn connect_postgres(dsn: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let pool_size = config.pool_size.max(1);
    let timeout = Duration::from_secs(config.timeout);

    let mut opt = ConnectOptions::new(dsn.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        ShortUrlError::database_connection(format!("无法连接到 PostgreSQL 数据库: {}", e))
    })
}

/// 运行数据库迁移（建表和唯一索引）
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ShortUrlError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
