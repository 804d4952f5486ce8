//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own catalog database.

use super::constants::*;
use album_catalog_server::catalog::{CatalogStore, SqliteCatalogStore};
use album_catalog_server::metadata::{MetadataProvider, MetadataResult};
use album_catalog_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use album_catalog_server::StatusCodeScheme;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Metadata provider resolving only `KNOWN_BARCODE`
struct StubMetadataProvider;

#[async_trait]
impl MetadataProvider for StubMetadataProvider {
    async fn search_by_barcode(&self, barcode: &str) -> Option<MetadataResult> {
        if barcode != KNOWN_BARCODE {
            return None;
        }
        Some(MetadataResult {
            id: "b84ee12a-09ef-421b-82de-0441a926375b".to_string(),
            title: Some(KNOWN_BARCODE_TITLE.to_string()),
            artist: KNOWN_BARCODE_ARTIST.to_string(),
            year: Some(1969),
            barcode: barcode.to_string(),
            cover_url: Some(
                "https://coverartarchive.org/release/b84ee12a-09ef-421b-82de-0441a926375b/front"
                    .to_string(),
            ),
            genre: "rock".to_string(),
        })
    }

    fn shutdown(&self) {}
}

/// Test server instance with an isolated catalog database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog store for direct database access in tests
    pub catalog_store: Arc<dyn CatalogStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port using legacy status codes
    pub async fn spawn() -> Self {
        Self::spawn_with(StatusCodeScheme::Legacy).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound, or
    /// the server does not become ready within the timeout.
    pub async fn spawn_with(status_codes: StatusCodeScheme) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let catalog_store: Arc<dyn CatalogStore> = Arc::new(
            SqliteCatalogStore::new(temp_db_dir.path().join("albums.db"))
                .expect("Failed to open catalog store"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            host: "127.0.0.1".to_string(),
            port,
            status_codes,
        };
        let app = make_app(
            config,
            catalog_store.clone(),
            Arc::new(StubMetadataProvider),
        );

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
            catalog_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling /healthz
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

            match client.get(format!("{}/healthz", self.base_url)).send().await {
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
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
