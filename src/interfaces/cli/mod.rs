//! CLI interface module

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::config::AppConfig;
use crate::errors::ShortUrlError;
use crate::services::{DeleteDispatcher, UrlService};
use crate::storage::StorageFactory;
use commands::{
    config_generate, delete_codes, get_code, list_urls, ping_storage, shorten_batch, shorten_url,
    show_stats,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
    Service(ShortUrlError),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
            CliError::Service(err) => err.format_simple(),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
            CliError::Service(err) => err.format_colored(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<ShortUrlError> for CliError {
    fn from(err: ShortUrlError) -> Self {
        if err.is_storage_failure() {
            CliError::StorageError(err.to_string())
        } else {
            CliError::Service(err)
        }
    }
}

fn owner_or_new(owner: Option<String>) -> String {
    owner
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &AppConfig) -> Result<(), CliError> {
    // config generate 不需要连接存储
    if let Commands::Config { action } = cmd {
        let ConfigCommands::Generate { output_path, force } = action;
        return config_generate(output_path, force);
    }

    let storage = StorageFactory::create(config).await?;
    let service = Arc::new(UrlService::from_config(storage, config));

    match cmd {
        Commands::Shorten { url, owner } => {
            shorten_url(&service, url, &owner_or_new(owner)).await
        }
        Commands::Batch { entries, owner } => {
            shorten_batch(&service, entries, &owner_or_new(owner)).await
        }
        Commands::Get { code } => get_code(&service, &code).await,
        Commands::List { owner, json } => list_urls(&service, &owner, json).await,
        Commands::Delete { codes, owner } => {
            let dispatcher = DeleteDispatcher::spawn(service.clone(), &config.deleter);
            let result = delete_codes(&dispatcher, codes, &owner).await;
            dispatcher.shutdown().await;
            result
        }
        Commands::Stats => show_stats(&service).await,
        Commands::Ping => ping_storage(&service).await,
        Commands::Config { .. } => Ok(()),
    }
}
