//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and media directories.

use super::constants::*;
use audiocloud_server::config::MediaSettings;
use audiocloud_server::ingestion::{IngestionManager, StagingStore};
use audiocloud_server::playlist_store::{PlaylistStore, SqlitePlaylistStore};
use audiocloud_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated storage
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Playlist store for direct database access in tests
    pub playlist_store: Arc<dyn PlaylistStore>,

    root_path: PathBuf,
    temp_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be created, the port cannot be bound or the
    /// server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root_path = temp_dir.path().join("static");
        let temp_path = temp_dir.path().join("tmp");

        let playlist_store: Arc<dyn PlaylistStore> = Arc::new(
            SqlitePlaylistStore::new(temp_dir.path().join("playlists.db"))
                .expect("Failed to open playlist store"),
        );

        let staging = StagingStore::new(&root_path, &temp_path);
        staging.init().await.expect("Failed to init staging store");
        let ingestion_manager = Arc::new(IngestionManager::new(staging, playlist_store.clone()));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            media: MediaSettings {
                public_base_url: base_url.clone(),
                max_upload_size_mb: TEST_MAX_UPLOAD_SIZE_MB,
                ..Default::default()
            },
            ..Default::default()
        };

        let app = make_app(config, playlist_store.clone(), ingestion_manager)
            .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            playlist_store,
            root_path,
            temp_path,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Permanent media root, one directory per playlist
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Scratch directory for uploads in progress
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Names of the entries directly inside `dir`
    pub fn entries_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("Failed to read dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Waits for the server to become ready by polling the home endpoint
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
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
