//! shorturl - a URL shortener core
//!
//! Maps long URLs to fixed-length random codes and back. Three interchangeable
//! storage backends share one `Storage` contract:
//!
//! - an in-memory index rebuilt from an append-only JSON-lines log
//! - PostgreSQL
//! - SQLite
//!
//! # Architecture
//! - `storage`: the `Storage` trait, backends and the factory that picks one
//! - `services`: code generation, validation, `UrlService`, the delete worker pool
//! - `config`: `AppConfig` loaded from TOML and `SHORTURL__*` variables
//! - `interfaces`: the command-line front end
//! - `system`: logging initialization

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
