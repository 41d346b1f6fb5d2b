mod file_config;

pub use file_config::{DatabaseConfig, FileConfig, MetadataConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub shutdown_grace_sec: u64,
    pub db_path: PathBuf,
    pub db_read_pool_size: usize,
    pub db_timeout_sec: u64,
    pub metadata_host: String,
    pub metadata_port: u16,
    pub metadata_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            logging_level: RequestsLoggingLevel::Path,
            shutdown_grace_sec: 10,
            db_path: PathBuf::from("songs.db"),
            db_read_pool_size: 4,
            db_timeout_sec: 5,
            metadata_host: "localhost".to_string(),
            metadata_port: 8081,
            metadata_timeout_sec: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub shutdown_grace: Duration,
    pub database: DatabaseSettings,
    pub metadata: MetadataSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub read_pool_size: usize,
    /// Upper bound for a single store operation, including lock waits.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MetadataSettings {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl MetadataSettings {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        if host.trim().is_empty() {
            bail!("Server host must not be empty");
        }
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let shutdown_grace_sec = file.shutdown_grace_sec.unwrap_or(cli.shutdown_grace_sec);

        let db_file = file.database.unwrap_or_default();
        let database = DatabaseSettings {
            path: db_file
                .path
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.db_path.clone()),
            read_pool_size: db_file.read_pool_size.unwrap_or(cli.db_read_pool_size),
            timeout: Duration::from_secs(require_positive(
                "Database timeout",
                db_file.timeout_sec.unwrap_or(cli.db_timeout_sec),
            )?),
        };
        if database.read_pool_size == 0 {
            bail!("Database read pool size must be at least 1");
        }

        let metadata_file = file.metadata.unwrap_or_default();
        let metadata = MetadataSettings {
            host: metadata_file
                .host
                .unwrap_or_else(|| cli.metadata_host.clone()),
            port: metadata_file.port.unwrap_or(cli.metadata_port),
            timeout: Duration::from_secs(require_positive(
                "Metadata timeout",
                metadata_file.timeout_sec.unwrap_or(cli.metadata_timeout_sec),
            )?),
        };
        if metadata.host.trim().is_empty() {
            bail!("Metadata service host must not be empty");
        }

        Ok(Self {
            host,
            port,
            logging_level,
            shutdown_grace: Duration::from_secs(shutdown_grace_sec),
            database,
            metadata,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            shutdown_grace: self.shutdown_grace,
        }
    }
}

/// Loads `KEY=value` pairs from a dotenv file into the process environment.
///
/// Variables already present in the environment are left alone. Returns
/// `Ok(false)` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load env file {:?}", path)),
    }
}

fn require_positive(name: &str, value: u64) -> Result<u64> {
    if value == 0 {
        bail!("{} must be at least 1 second", name);
    }
    Ok(value)
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
