//! URL service and delete dispatcher tests
//!
//! 服务层测试同时覆盖内存存储和 SQLite，两者对冲突的表现必须一致。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shorturl::config::{AppConfig, DeleterConfig, GeneratorConfig};
use shorturl::errors::{Result, ShortUrlError};
use shorturl::services::{
    ALPHABET, BatchRequest, CODE_LENGTH, DeleteDispatcher, UrlService, is_valid_code,
};
use shorturl::storage::{
    BackendInfo, BatchUrl, BatchUrlItem, LogBackedStorage, ShortUrl, Storage, StorageFactory,
};
use tempfile::TempDir;

fn memory_service(dir: &TempDir) -> UrlService {
    let storage = LogBackedStorage::open(dir.path().join("filestorage.txt"), true).unwrap();
    UrlService::new(Arc::new(storage), &GeneratorConfig::default())
}

async fn sqlite_service(dir: &TempDir) -> UrlService {
    let mut config = AppConfig::default();
    config.storage.database_dsn =
        format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let storage = StorageFactory::create(&config).await.unwrap();
    UrlService::from_config(storage, &config)
}

fn request(correlation_id: &str, url: &str) -> BatchRequest {
    BatchRequest {
        correlation_id: correlation_id.to_string(),
        original_url: url.to_string(),
    }
}

// =============================================================================
// 创建
// =============================================================================

#[cfg(test)]
mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_shorten_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let service = memory_service(&dir);

        let code = service.create("https://example.com", "u1").await.unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));

        let record = service.resolve(&code).await.unwrap().unwrap();
        assert_eq!(record.original_url, "https://example.com");

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.urls, 1);
        assert_eq!(stats.users, 1);
    }

    async fn assert_second_create_conflicts(service: &UrlService) {
        let first = service.create("https://example.com/dup", "u1").await.unwrap();
        let err = service
            .create("https://example.com/dup", "u2")
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.existing_code(), Some(first.as_str()));
        assert_eq!(service.stats().await.unwrap().urls, 1);
    }

    #[tokio::test]
    async fn test_conflict_memory() {
        let dir = TempDir::new().unwrap();
        assert_second_create_conflicts(&memory_service(&dir)).await;
    }

    #[tokio::test]
    async fn test_conflict_sqlite() {
        let dir = TempDir::new().unwrap();
        assert_second_create_conflicts(&sqlite_service(&dir).await).await;
    }

    #[tokio::test]
    async fn test_codes_are_distinct() {
        let dir = TempDir::new().unwrap();
        let service = memory_service(&dir);

        let mut codes = std::collections::HashSet::new();
        for i in 0..50 {
            let code = service
                .create(&format!("https://example.com/{}", i), "u1")
                .await
                .unwrap();
            assert!(is_valid_code(&code));
            codes.insert(code);
        }
        assert_eq!(codes.len(), 50);
    }
}

// =============================================================================
// 参数校验
// =============================================================================

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_input_never_reaches_storage() {
        let dir = TempDir::new().unwrap();
        let service = memory_service(&dir);

        assert!(matches!(
            service.create("not a url", "u1").await,
            Err(ShortUrlError::InvalidUrl(_))
        ));
        assert!(matches!(
            service.create("https://example.com", "").await,
            Err(ShortUrlError::Validation(_))
        ));
        assert!(matches!(
            service.create_batch(&[], "u1").await,
            Err(ShortUrlError::Validation(_))
        ));
        assert!(matches!(
            service
                .create_batch(&[request("", "https://example.com")], "u1")
                .await,
            Err(ShortUrlError::Validation(_))
        ));
        assert!(matches!(
            service.delete(&[], "u1").await,
            Err(ShortUrlError::Validation(_))
        ));

        assert_eq!(service.stats().await.unwrap().urls, 0);
    }

    #[tokio::test]
    async fn test_batch_with_one_bad_url_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let service = memory_service(&dir);

        let result = service
            .create_batch(
                &[
                    request("1", "https://ok.example"),
                    request("2", "missing-scheme.example"),
                ],
                "u1",
            )
            .await;
        assert!(matches!(result, Err(ShortUrlError::InvalidUrl(_))));
        assert_eq!(service.stats().await.unwrap().urls, 0);
    }
}

// =============================================================================
// 批量创建
// =============================================================================

#[cfg(test)]
mod batch_tests {
    use super::*;

    async fn assert_batch_semantics(service: &UrlService) {
        let existing = service.create("https://example.com/a", "u1").await.unwrap();

        let results = service
            .create_batch(
                &[
                    request("x", "https://example.com/a"),
                    request("y", "https://example.com/b"),
                    request("z", "https://example.com/a"),
                ],
                "u2",
            )
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.correlation_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(results[0].code, existing);
        assert_eq!(results[2].code, existing);
        assert_ne!(results[1].code, existing);
        assert_eq!(service.stats().await.unwrap().urls, 2);
    }

    #[tokio::test]
    async fn test_batch_memory() {
        let dir = TempDir::new().unwrap();
        assert_batch_semantics(&memory_service(&dir)).await;
    }

    #[tokio::test]
    async fn test_batch_sqlite() {
        let dir = TempDir::new().unwrap();
        assert_batch_semantics(&sqlite_service(&dir).await).await;
    }
}

// =============================================================================
// 删除与查询
// =============================================================================

#[cfg(test)]
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_and_user_urls() {
        let dir = TempDir::new().unwrap();
        let service = memory_service(&dir);

        let mine = service.create("https://mine.example", "u1").await.unwrap();
        let theirs = service.create("https://theirs.example", "u2").await.unwrap();

        let flagged = service
            .delete(&[mine.clone(), theirs.clone()], "u1")
            .await
            .unwrap();
        assert_eq!(flagged, 1);

        let urls = service.user_urls("u1").await.unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].is_deleted);

        // 已删除的短码仍可查到，带删除标记
        assert!(service.resolve(&mine).await.unwrap().unwrap().is_deleted);
        assert!(!service.resolve(&theirs).await.unwrap().unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_dispatcher_deletes_in_background() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(memory_service(&dir));
        let code = service.create("https://example.com", "u1").await.unwrap();

        let dispatcher = DeleteDispatcher::spawn(
            service.clone(),
            &DeleterConfig {
                workers: 2,
                queue_capacity: 8,
            },
        );
        let ticket = dispatcher.dispatch(vec![code.clone()], "u1").unwrap();
        assert_eq!(ticket.wait().await.unwrap(), 1);
        assert!(service.resolve(&code).await.unwrap().unwrap().is_deleted);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_dropped_ticket_does_not_cancel_delete() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(memory_service(&dir));
        let code = service.create("https://example.com", "u1").await.unwrap();

        let dispatcher = DeleteDispatcher::spawn(
            service.clone(),
            &DeleterConfig {
                workers: 1,
                queue_capacity: 8,
            },
        );
        drop(dispatcher.dispatch(vec![code.clone()], "u1").unwrap());

        // shutdown 会处理完已入队的请求
        dispatcher.shutdown().await;
        assert!(service.resolve(&code).await.unwrap().unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_invalid_request() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(memory_service(&dir));
        let dispatcher = DeleteDispatcher::spawn(service, &DeleterConfig::default());

        assert!(matches!(
            dispatcher.dispatch(vec![], "u1"),
            Err(ShortUrlError::Validation(_))
        ));
        assert!(matches!(
            dispatcher.dispatch(vec!["abc".to_string()], ""),
            Err(ShortUrlError::Validation(_))
        ));
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_full_queue_rejects_without_blocking() {
        let service = Arc::new(UrlService::new(
            Arc::new(HangingStorage),
            &GeneratorConfig::default(),
        ));
        let dispatcher = DeleteDispatcher::spawn(
            service,
            &DeleterConfig {
                workers: 1,
                queue_capacity: 1,
            },
        );

        // 唯一的 worker 卡在第一个请求上，第二个占满队列
        let _first = dispatcher.dispatch(vec!["a".to_string()], "u1").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _second = dispatcher.dispatch(vec!["b".to_string()], "u1").unwrap();

        let err = dispatcher
            .dispatch(vec!["c".to_string()], "u1")
            .err()
            .unwrap();
        assert!(matches!(err, ShortUrlError::DeleteQueueFull(_)));
    }
}

// =============================================================================
// ping
// =============================================================================

/// ping 和软删除永远不返回的存储
struct HangingStorage;

#[async_trait]
impl Storage for HangingStorage {
    async fn ping(&self) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
    async fn save(&self, _: &str, _: &str, _: &str) -> Result<i64> {
        Ok(1)
    }
    async fn save_batch(&self, _: &[BatchUrlItem], _: &str) -> Result<Vec<BatchUrl>> {
        Ok(Vec::new())
    }
    async fn find_by_code(&self, _: &str) -> Result<Option<ShortUrl>> {
        Ok(None)
    }
    async fn find_by_url(&self, _: &str) -> Result<Option<ShortUrl>> {
        Ok(None)
    }
    async fn find_by_owner(&self, _: &str) -> Result<Vec<ShortUrl>> {
        Ok(Vec::new())
    }
    async fn soft_delete(&self, _: &[String], _: &str) -> Result<u64> {
        std::future::pending::<()>().await;
        Ok(0)
    }
    async fn count_records(&self) -> Result<u64> {
        Ok(0)
    }
    async fn count_distinct_owners(&self) -> Result<u64> {
        Ok(0)
    }
    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            storage_type: "hanging".to_string(),
            persistent: false,
        }
    }
}

#[cfg(test)]
mod ping_tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_memory() {
        let dir = TempDir::new().unwrap();
        memory_service(&dir).ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_times_out() {
        let service = UrlService::new(Arc::new(HangingStorage), &GeneratorConfig::default())
            .with_ping_timeout(Duration::from_millis(50));

        let err = service.ping().await.unwrap_err();
        assert!(matches!(err, ShortUrlError::Timeout(_)));
    }
}
