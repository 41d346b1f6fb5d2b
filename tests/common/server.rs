//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and its own fake
//! metadata service.

use super::constants::*;
use super::fake_metadata::make_fake_metadata_app;
use song_library::metadata::HttpMetadataClient;
use song_library::server::{make_app, serve, RequestsLoggingLevel, ServerConfig, ServerState};
use song_library::song_store::{SongRepository, SqliteSongStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Test server instance with an isolated database
///
/// When dropped, the server and the fake metadata service shut down and temp
/// resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Song store for direct database access in tests
    #[allow(dead_code)]
    pub store: Arc<SqliteSongStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    shutdown: CancellationToken,
}

async fn bind_random_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    (listener, port)
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary songs database
    /// 2. Starts the fake metadata service on a random port
    /// 3. Binds the server to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding or startup fails.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteSongStore::new(
                temp_db_dir.path().join("songs.db"),
                2,
                Duration::from_secs(5),
            )
            .expect("Failed to open song store"),
        );

        let shutdown = CancellationToken::new();

        // Fake metadata service
        let (metadata_listener, metadata_port) = bind_random_port().await;
        let metadata_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(metadata_listener, make_fake_metadata_app())
                .with_graceful_shutdown(metadata_shutdown.cancelled_owned())
                .await
                .expect("Fake metadata service failed");
        });
        let metadata_client = Arc::new(
            HttpMetadataClient::new(
                format!("http://127.0.0.1:{}", metadata_port),
                Duration::from_secs(5),
            )
            .expect("Failed to build metadata client"),
        );

        // Song library server
        let (listener, port) = bind_random_port().await;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            host: "127.0.0.1".to_string(),
            port,
            shutdown_grace: Duration::from_secs(1),
        };
        let state = ServerState::new(
            config,
            SongRepository::new(store.clone(), Duration::from_secs(5)),
            metadata_client,
            "test".to_string(),
        );
        let app = make_app(state);

        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            serve(listener, app, server_shutdown, Duration::from_secs(1))
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            shutdown,
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the status endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        // TempDir will be cleaned up automatically
    }
}
