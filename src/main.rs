use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_library::config;
use song_library::metadata::HttpMetadataClient;
use song_library::server::{run_server, RequestsLoggingLevel, ServerState};
use song_library::song_store::{SongRepository, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The host to listen on.
    #[clap(long, env = "SERVER_HOST", default_value = "localhost")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, env = "REQUESTS_LOGGING_LEVEL", default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Seconds in-flight requests may keep running after a shutdown signal.
    #[clap(long, env = "SHUTDOWN_GRACE_SEC", default_value_t = 10)]
    pub shutdown_grace_sec: u64,

    /// Path to the SQLite songs database file. Created if missing.
    #[clap(long, env = "DATABASE_PATH", value_parser = parse_path, default_value = "songs.db")]
    pub db_path: PathBuf,

    /// Number of read-only database connections.
    #[clap(long, env = "DATABASE_READ_POOL_SIZE", default_value_t = 4)]
    pub db_read_pool_size: usize,

    /// Timeout in seconds for a single database operation.
    #[clap(long, env = "DATABASE_TIMEOUT_SEC", default_value_t = 5)]
    pub db_timeout_sec: u64,

    /// Host of the song metadata service.
    #[clap(long, env = "EXTERNAL_SERVICE_HOST", default_value = "localhost")]
    pub metadata_host: String,

    /// Port of the song metadata service.
    #[clap(long, env = "EXTERNAL_SERVICE_PORT", default_value_t = 8081)]
    pub metadata_port: u16,

    /// Timeout in seconds for metadata service requests.
    #[clap(long, env = "EXTERNAL_SERVICE_TIMEOUT_SEC", default_value_t = 10)]
    pub metadata_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            host: args.host.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            shutdown_grace_sec: args.shutdown_grace_sec,
            db_path: args.db_path.clone(),
            db_read_pool_size: args.db_read_pool_size,
            db_timeout_sec: args.db_timeout_sec,
            metadata_host: args.metadata_host.clone(),
            metadata_port: args.metadata_port,
            metadata_timeout_sec: args.metadata_timeout_sec,
        }
    }
}

/// Cancels `token` on the first SIGINT or SIGTERM.
fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
            _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
        }
        token.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Settings from .env must be in the environment before clap reads it
    let env_file = config::load_env_file(std::path::Path::new(".env"));
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    if env_file? {
        info!("Loaded environment from .env");
    }

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  database: {:?}", app_config.database.path);
    info!("  metadata service: {}", app_config.metadata.base_url());
    info!("  listening on: {}:{}", app_config.host, app_config.port);

    info!("Opening SQLite songs database at {:?}...", app_config.database.path);
    let song_store = Arc::new(SqliteSongStore::new(
        &app_config.database.path,
        app_config.database.read_pool_size,
        app_config.database.timeout,
    )?);
    let repository = SongRepository::new(song_store.clone(), app_config.database.timeout);

    let metadata_client = Arc::new(HttpMetadataClient::new(
        app_config.metadata.base_url(),
        app_config.metadata.timeout,
    )?);

    let state = ServerState::new(
        app_config.server_config(),
        repository,
        metadata_client,
        env!("GIT_HASH").to_string(),
    );

    let shutdown_token = CancellationToken::new();
    spawn_signal_listener(shutdown_token.clone());

    let result = run_server(state, shutdown_token).await;
    if let Err(e) = &result {
        error!("HTTP server stopped with error: {:?}", e);
    }

    info!("Closing songs database");
    if let Err(e) = song_store.checkpoint() {
        error!("Failed to checkpoint songs database: {}", e);
    }
    drop(song_store);
    info!("Shutdown complete");

    result
}
