//! 基于追加日志的内存存储
//!
//! 启动时由 `Consumer` 重放整个日志文件重建索引，之后每次写入都由 `Producer`
//! 追加一行 JSON。索引和日志写入端由同一把读写锁保护。

mod consumer;
mod producer;

pub use consumer::Consumer;
pub use producer::Producer;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::errors::{Result, ShortUrlError};
use crate::storage::{BackendInfo, BatchUrl, BatchUrlItem, ShortUrl, Storage};

struct Index {
    by_code: HashMap<String, ShortUrl>,
    producer: Producer,
    next_id: i64,
}

impl Index {
    fn find_by_url(&self, original_url: &str) -> Option<&ShortUrl> {
        self.by_code
            .values()
            .find(|record| record.original_url == original_url)
    }

    /// 插入一条新记录并写入日志。先写日志再更新索引，写失败时索引保持不变。
    fn insert(&mut self, code: &str, original_url: &str, owner_id: &str) -> Result<i64> {
        if let Some(existing) = self.find_by_url(original_url) {
            return Err(ShortUrlError::url_conflict(original_url, &existing.code));
        }
        if self.by_code.contains_key(code) {
            return Err(ShortUrlError::code_exists(format!(
                "短码已被占用: {}",
                code
            )));
        }

        let record = ShortUrl {
            id: self.next_id,
            code: code.to_string(),
            original_url: original_url.to_string(),
            owner_id: owner_id.to_string(),
            is_deleted: false,
        };
        self.producer.write_record(&record)?;

        self.next_id += 1;
        self.by_code.insert(record.code.clone(), record);
        Ok(self.next_id - 1)
    }
}

pub struct LogBackedStorage {
    path: PathBuf,
    persist_deletes: bool,
    inner: RwLock<Index>,
}

impl LogBackedStorage {
    /// 打开（或创建）日志文件并重放全部记录
    ///
    /// 同一短码出现多次时后出现的行覆盖前面的行。任何无法解析的行都会导致加载失败。
    pub fn open<P: AsRef<Path>>(path: P, persist_deletes: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Producer 负责创建文件，Consumer 随后可以安全打开
        let producer = Producer::open(&path)?;
        let records = Consumer::open(&path)?.read_all()?;

        let mut by_code = HashMap::with_capacity(records.len());
        let mut max_id = 0;
        for record in records {
            max_id = max_id.max(record.id);
            by_code.insert(record.code.clone(), record);
        }

        info!(
            "Log-backed storage loaded {} records from {}",
            by_code.len(),
            path.display()
        );

        Ok(Self {
            path,
            persist_deletes,
            inner: RwLock::new(Index {
                by_code,
                producer,
                next_id: max_id + 1,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Storage for LogBackedStorage {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn save(&self, code: &str, original_url: &str, owner_id: &str) -> Result<i64> {
        let mut index = self.inner.write();
        let id = index.insert(code, original_url, owner_id)?;
        debug!("Saved {} -> {} (id {})", code, original_url, id);
        Ok(id)
    }

    async fn save_batch(&self, items: &[BatchUrlItem], owner_id: &str) -> Result<Vec<BatchUrl>> {
        let mut index = self.inner.write();
        let mut results = Vec::with_capacity(items.len());

        // 逐条写入，不回滚：出错前已写入的条目保留
        for item in items {
            let code = match index.insert(&item.code, &item.original_url, owner_id) {
                Ok(_) => item.code.clone(),
                Err(ShortUrlError::UrlConflict { existing_code, .. }) => {
                    debug!(
                        "Batch item {} resolved to existing code {}",
                        item.correlation_id, existing_code
                    );
                    existing_code
                }
                Err(e) => return Err(e),
            };
            results.push(BatchUrl {
                correlation_id: item.correlation_id.clone(),
                code,
            });
        }

        Ok(results)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        Ok(self.inner.read().by_code.get(code).cloned())
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrl>> {
        Ok(self.inner.read().find_by_url(original_url).cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ShortUrl>> {
        let index = self.inner.read();
        let mut records: Vec<ShortUrl> = index
            .by_code
            .values()
            .filter(|record| record.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn soft_delete(&self, codes: &[String], owner_id: &str) -> Result<u64> {
        let mut index = self.inner.write();
        let Index {
            by_code, producer, ..
        } = &mut *index;

        let mut flagged = 0;
        let unique: HashSet<&String> = codes.iter().collect();
        for code in unique {
            let Some(record) = by_code.get_mut(code.as_str()) else {
                continue;
            };
            if record.owner_id != owner_id || record.is_deleted {
                continue;
            }

            if self.persist_deletes {
                let mut updated = record.clone();
                updated.is_deleted = true;
                producer.write_record(&updated)?;
            }
            record.is_deleted = true;
            flagged += 1;
        }

        Ok(flagged)
    }

    async fn count_records(&self) -> Result<u64> {
        Ok(self.inner.read().by_code.len() as u64)
    }

    async fn count_distinct_owners(&self) -> Result<u64> {
        let index = self.inner.read();
        let owners: HashSet<&str> = index
            .by_code
            .values()
            .map(|record| record.owner_id.as_str())
            .collect();
        Ok(owners.len() as u64)
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            storage_type: "memory".to_string(),
            persistent: true,
        }
    }
}
