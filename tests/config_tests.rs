//! Configuration loading tests
//!
//! 配置文件均写入临时目录，不读取工作目录下的 shorturl.toml。

use std::io::Write;

use shorturl::config::AppConfig;
use shorturl::storage::{StorageFactory, StorageKind, infer_backend_from_dsn};
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_explicit_file() {
    let file = write_config(
        r#"
        [storage]
        file_storage_path = "/var/lib/shorturl/log.txt"
        persist_deletes = false

        [generator]
        max_attempts = 7

        [deleter]
        workers = 3
        "#,
    );

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.storage.file_storage_path, "/var/lib/shorturl/log.txt");
    assert!(!config.storage.persist_deletes);
    assert_eq!(config.generator.max_attempts, 7);
    assert_eq!(config.deleter.workers, 3);
    // 未出现的段落使用默认值
    assert_eq!(config.database.retry_count, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(AppConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_sample_config_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.toml");
    AppConfig::default().save_to_file(&path).unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.storage.ping_timeout_ms, 1000);
    assert_eq!(config.deleter.queue_capacity, 1024);
}

#[test]
fn test_dsn_selects_backend() {
    assert_eq!(infer_backend_from_dsn("").unwrap(), StorageKind::Memory);
    assert_eq!(
        infer_backend_from_dsn("postgres://localhost/urls").unwrap(),
        StorageKind::Postgres
    );
    assert_eq!(
        infer_backend_from_dsn("sqlite://urls.db").unwrap(),
        StorageKind::Sqlite
    );
}

#[tokio::test]
async fn test_factory_builds_memory_store_without_dsn() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.storage.file_storage_path = dir
        .path()
        .join("nested")
        .join("filestorage.txt")
        .display()
        .to_string();

    let storage = StorageFactory::create(&config).await.unwrap();
    assert_eq!(storage.backend_info().storage_type, "memory");
    assert!(dir.path().join("nested").join("filestorage.txt").exists());
}

#[tokio::test]
async fn test_factory_builds_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.storage.database_dsn =
        format!("sqlite://{}?mode=rwc", dir.path().join("urls.db").display());

    let storage = StorageFactory::create(&config).await.unwrap();
    assert_eq!(storage.backend_info().storage_type, "sqlite");
}

#[tokio::test]
async fn test_factory_rejects_unknown_dsn() {
    let mut config = AppConfig::default();
    config.storage.database_dsn = "redis://localhost".to_string();
    assert!(StorageFactory::create(&config).await.is_err());
}
