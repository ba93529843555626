//! 数据库操作重试
//!
//! 只重试瞬时错误：连接池耗尽、断线、锁竞争。唯一约束冲突等错误原样返回，
//! 由上层解析为 `UrlConflict` / `CodeExists`。

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 锁竞争类错误码：PostgreSQL 40001/40P01/55P03，SQLite BUSY/LOCKED/BUSY_SNAPSHOT
const CONTENTION_CODES: &[&str] = &["40001", "40P01", "55P03", "5", "6", "517"];

/// 驱动没有给出错误码时按消息匹配
const CONTENTION_MESSAGES: &[&str] = &["deadlock", "database is locked", "serialization failure"];

/// 瞬时错误的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transient {
    /// 连接池获取超时
    Pool,
    /// 连接断开
    Connection,
    /// 死锁、锁忙、序列化失败
    Contention,
}

/// 返回 `Some` 表示该错误值得重试
pub fn classify(err: &DbErr) -> Option<Transient> {
    match err {
        DbErr::ConnectionAcquire(_) => Some(Transient::Pool),
        DbErr::Conn(_) => Some(Transient::Connection),
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            is_contention(runtime).then_some(Transient::Contention)
        }
        _ => None,
    }
}

fn is_contention(err: &RuntimeErr) -> bool {
    let message = match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(code) = sqlx_err.as_database_error().and_then(|e| e.code()) {
                return CONTENTION_CODES.contains(&code.as_ref());
            }
            sqlx_err.to_string()
        }
        RuntimeErr::Internal(msg) => msg.clone(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    let message = message.to_lowercase();
    CONTENTION_MESSAGES.iter().any(|m| message.contains(m))
}

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 退避计划：每次翻倍，封顶后不再增长，另加最多 1/4 的随机抖动
#[derive(Debug)]
struct Backoff {
    next_ms: u64,
    max_ms: u64,
    remaining: u32,
}

impl Backoff {
    fn new(config: RetryConfig) -> Self {
        Self {
            next_ms: config.base_delay_ms,
            max_ms: config.max_delay_ms,
            remaining: config.max_retries,
        }
    }

    /// 重试次数用完时返回 `None`
    fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let base = self.next_ms.min(self.max_ms);
        self.next_ms = self.next_ms.saturating_mul(2);
        let jitter = rand::rng().random_range(0..=base / 4);
        Some(Duration::from_millis(base.saturating_add(jitter)))
    }
}

/// 执行数据库操作，瞬时错误按退避计划重试
pub async fn with_retry<T, F, Fut>(label: &str, config: RetryConfig, mut op: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut backoff = Backoff::new(config);
    let mut retries = 0u32;

    loop {
        let err = match op().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("{}: ok after {} retries", label, retries);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let Some(kind) = classify(&err) else {
            return Err(err);
        };
        let Some(delay) = backoff.next_delay() else {
            warn!("{}: giving up after {} retries ({:?}): {}", label, retries, kind, err);
            return Err(err);
        };

        retries += 1;
        warn!(
            "{}: {:?} error, retry {}/{} in {:?}: {}",
            label, kind, retries, config.max_retries, delay, err
        );
        tokio::time::sleep(delay).await;
    }
}
