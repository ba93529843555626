//! URL 服务
//!
//! 负责短码生成与存储调用的编排，自身不保存状态，所有操作直接落到配置的 `Storage`。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::code_generator::CodeGenerator;
use super::validation::{validate_delete, validate_owner, validate_url};
use crate::config::{AppConfig, GeneratorConfig};
use crate::errors::{Result, ShortUrlError};
use crate::storage::{BatchUrl, BatchUrlItem, ShortUrl, Storage};

const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(1000);

/// 批量缩短请求中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub correlation_id: String,
    pub original_url: String,
}

/// 整个存储的汇总计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub urls: u64,
    pub users: u64,
}

pub struct UrlService {
    storage: Arc<dyn Storage>,
    generator: CodeGenerator,
    ping_timeout: Duration,
}

impl UrlService {
    pub fn new(storage: Arc<dyn Storage>, config: &GeneratorConfig) -> Self {
        Self {
            generator: CodeGenerator::new(storage.clone(), config),
            storage,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &AppConfig) -> Self {
        Self::new(storage, &config.generator)
            .with_ping_timeout(Duration::from_millis(config.storage.ping_timeout_ms))
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// 缩短单个 URL
    ///
    /// 已缩短过的 URL 返回 `UrlConflict`，其中带有已有短码，不重试。
    pub async fn create(&self, original_url: &str, owner_id: &str) -> Result<String> {
        validate_url(original_url)?;
        validate_owner(owner_id)?;

        let code = self.generator.generate_code().await?;
        match self.storage.save(&code, original_url, owner_id).await {
            Ok(id) => {
                info!("Shortened {} as {} (id {})", original_url, code, id);
                Ok(code)
            }
            Err(e) => {
                if e.is_conflict() {
                    debug!("{}", e.message());
                }
                Err(e)
            }
        }
    }

    /// 批量缩短，输出顺序与输入一致
    pub async fn create_batch(
        &self,
        requests: &[BatchRequest],
        owner_id: &str,
    ) -> Result<Vec<BatchUrl>> {
        validate_owner(owner_id)?;
        if requests.is_empty() {
            return Err(ShortUrlError::validation("batch cannot be empty"));
        }
        for request in requests {
            if request.correlation_id.trim().is_empty() {
                return Err(ShortUrlError::validation("correlation id cannot be empty"));
            }
            validate_url(&request.original_url)?;
        }

        let mut items = Vec::with_capacity(requests.len());
        for request in requests {
            items.push(BatchUrlItem {
                correlation_id: request.correlation_id.clone(),
                original_url: request.original_url.clone(),
                code: self.generator.generate_code().await?,
            });
        }

        let results = self.storage.save_batch(&items, owner_id).await?;
        info!("Batch of {} URLs shortened for {}", results.len(), owner_id);
        Ok(results)
    }

    /// 软删除 `owner_id` 名下的短码，其他用户的短码不受影响
    pub async fn delete(&self, codes: &[String], owner_id: &str) -> Result<u64> {
        validate_delete(codes, owner_id)?;

        let flagged = self.storage.soft_delete(codes, owner_id).await?;
        info!(
            "Deleted {} of {} requested codes for {}",
            flagged,
            codes.len(),
            owner_id
        );
        Ok(flagged)
    }

    /// 跳转查询，已删除的记录同样返回并带 `is_deleted` 标记
    pub async fn resolve(&self, code: &str) -> Result<Option<ShortUrl>> {
        self.storage.find_by_code(code).await
    }

    pub async fn user_urls(&self, owner_id: &str) -> Result<Vec<ShortUrl>> {
        validate_owner(owner_id)?;
        self.storage.find_by_owner(owner_id).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            urls: self.storage.count_records().await?,
            users: self.storage.count_distinct_owners().await?,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        tokio::time::timeout(self.ping_timeout, self.storage.ping())
            .await
            .map_err(|_| {
                ShortUrlError::timeout(format!(
                    "storage did not answer within {} ms",
                    self.ping_timeout.as_millis()
                ))
            })?
    }
}
