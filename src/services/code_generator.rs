//! 短码生成
//!
//! 从操作系统 CSPRNG 取 10 个字节，每个字节对 62 取模映射到 `a-zA-Z0-9`，
//! 再向存储确认短码未被占用（包括已删除的记录）。

use std::sync::Arc;

use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::errors::{Result, ShortUrlError};
use crate::storage::Storage;

pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 10;

/// 生成一个随机短码，不检查是否已被占用
pub fn random_code() -> Result<String> {
    let mut bytes = [0u8; CODE_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ShortUrlError::generation_failure(format!("随机源不可用: {}", e)))?;

    Ok(bytes
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect())
}

/// 短码格式是否合法：定长且只含字母数字
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub struct CodeGenerator {
    storage: Arc<dyn Storage>,
    max_attempts: u32,
}

impl CodeGenerator {
    pub fn new(storage: Arc<dyn Storage>, config: &GeneratorConfig) -> Self {
        Self {
            storage,
            max_attempts: config.max_attempts,
        }
    }

    /// 生成一个未被占用的短码
    ///
    /// 碰撞时重新生成；`max_attempts` 为 0 时不限次数。
    pub async fn generate_code(&self) -> Result<String> {
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let code = random_code()?;

            if !self.storage.code_exists(&code).await? {
                if attempts > 1 {
                    debug!("Generated code after {} attempts", attempts);
                }
                return Ok(code);
            }

            if self.max_attempts != 0 && attempts >= self.max_attempts {
                warn!("Code generation gave up after {} collisions", attempts);
                return Err(ShortUrlError::GenerationExhausted(attempts));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BackendInfo, BatchUrl, BatchUrlItem, ShortUrl};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 前 `taken` 次查询都报告短码已存在
    struct CollidingStorage {
        taken: u32,
        lookups: AtomicU32,
    }

    #[async_trait]
    impl Storage for CollidingStorage {
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
        async fn save(&self, _: &str, _: &str, _: &str) -> Result<i64> {
            unimplemented!()
        }
        async fn save_batch(&self, _: &[BatchUrlItem], _: &str) -> Result<Vec<BatchUrl>> {
            unimplemented!()
        }
        async fn find_by_code(&self, _: &str) -> Result<Option<ShortUrl>> {
            unimplemented!()
        }
        async fn find_by_url(&self, _: &str) -> Result<Option<ShortUrl>> {
            unimplemented!()
        }
        async fn find_by_owner(&self, _: &str) -> Result<Vec<ShortUrl>> {
            unimplemented!()
        }
        async fn soft_delete(&self, _: &[String], _: &str) -> Result<u64> {
            unimplemented!()
        }
        async fn count_records(&self) -> Result<u64> {
            Ok(0)
        }
        async fn count_distinct_owners(&self) -> Result<u64> {
            Ok(0)
        }
        async fn code_exists(&self, _: &str) -> Result<bool> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(n < self.taken)
        }
        fn backend_info(&self) -> BackendInfo {
            BackendInfo {
                storage_type: "colliding".to_string(),
                persistent: false,
            }
        }
    }

    fn generator(taken: u32, max_attempts: u32) -> (CodeGenerator, Arc<CollidingStorage>) {
        let storage = Arc::new(CollidingStorage {
            taken,
            lookups: AtomicU32::new(0),
        });
        let generator = CodeGenerator::new(storage.clone(), &GeneratorConfig { max_attempts });
        (generator, storage)
    }

    #[test]
    fn test_random_code_format() {
        for _ in 0..200 {
            let code = random_code().unwrap();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
            assert!(is_valid_code(&code));
        }
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("aB3dE6gH9k"));
        assert!(!is_valid_code("short"));
        assert!(!is_valid_code("aB3dE6gH9-"));
        assert!(!is_valid_code("aB3dE6gH9kX"));
    }

    #[tokio::test]
    async fn test_retries_on_collision() {
        let (generator, storage) = generator(3, 100);
        let code = generator.generate_code().await.unwrap();
        assert!(is_valid_code(&code));
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_gives_up_at_max_attempts() {
        let (generator, storage) = generator(u32::MAX, 5);
        let err = generator.generate_code().await.unwrap_err();
        assert_eq!(err, ShortUrlError::GenerationExhausted(5));
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_is_unbounded() {
        let (generator, storage) = generator(250, 0);
        generator.generate_code().await.unwrap();
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 251);
    }
}
