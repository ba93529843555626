//! Command-line interface definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// shorturl - shorten URLs against a log file, PostgreSQL or SQLite
#[derive(Parser, Debug)]
#[command(name = "shorturl")]
#[command(version)]
#[command(about = "Shorten URLs and manage short codes", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ./shorturl.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Database DSN; postgres:// selects PostgreSQL, sqlite:// or *.db selects SQLite
    #[arg(long, short = 'd', env = "DATABASE_DSN", global = true)]
    pub database_dsn: Option<String>,

    /// Append-only log used when no database DSN is set
    #[arg(long, short = 'f', env = "FILE_STORAGE_PATH", global = true)]
    pub file_storage_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line values win over the config file and SHORTURL__* variables
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dsn) = &self.database_dsn {
            config.storage.database_dsn = dsn.clone();
        }
        if let Some(path) = self.file_storage_path.as_ref().filter(|p| !p.is_empty()) {
            config.storage.file_storage_path = path.clone();
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shorten a URL
    Shorten {
        /// URL to shorten
        url: String,

        /// Owner id (default: a fresh UUID)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Shorten several URLs in one batch
    ///
    /// Usage: batch <CORRELATION_ID=URL>...
    Batch {
        #[arg(required = true, num_args = 1..)]
        entries: Vec<String>,

        /// Owner id (default: a fresh UUID)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Look up a short code
    Get {
        code: String,
    },

    /// List the URLs created by an owner
    List {
        #[arg(long)]
        owner: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Soft delete short codes owned by an owner
    Delete {
        #[arg(required = true, num_args = 1..)]
        codes: Vec<String>,

        #[arg(long)]
        owner: String,
    },

    /// Show record and owner counts
    Stats,

    /// Check that the storage backend answers
    Ping,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: shorturl.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Split `CORRELATION_ID=URL` into its two halves
    pub fn parse_batch_entry(entry: &str) -> Option<(String, String)> {
        let (id, url) = entry.split_once('=')?;
        if id.is_empty() || url.is_empty() {
            return None;
        }
        Some((id.to_string(), url.to_string()))
    }
}
