//! Integration tests for Shopfront.
//!
//! Each test starts the API on an ephemeral port with the in-memory store
//! and drives it through `shopfront-client`, the same way a front end does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopfront_api::config::ApiConfig;
use shopfront_api::db::{CategoryRepository, DocumentStore, MemoryDocumentStore, UserRepository};
use shopfront_api::state::AppState;
use shopfront_client::navigation::History;
use shopfront_client::{ClientConfig, Navigator, Notify, ShopClient, TracingNotify};
use shopfront_core::models::Category;
use shopfront_core::{CategoryId, Role};

/// A running API with direct access to its store.
pub struct TestContext {
    pub addr: SocketAddr,
    pub store: Arc<dyn DocumentStore>,
    _uploads: TempDir,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a fresh API.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn start() -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create uploads dir");
        let config = ApiConfig::local(uploads.path().to_path_buf());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let state = AppState::new(config.clone(), Arc::clone(&store));

        let listener = TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, shopfront_api::app(state))
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            store,
            _uploads: uploads,
            server,
        }
    }

    /// Base URL of the running API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// A client with its own session, logging notifications.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is invalid.
    #[must_use]
    pub fn client(&self) -> (ShopClient, Arc<History>) {
        let history = Arc::new(History::new());
        let config = ClientConfig::with_api_url(&self.base_url()).expect("Invalid base URL");
        let client = ShopClient::with_sinks(
            &config,
            Arc::new(TracingNotify) as Arc<dyn Notify>,
            Arc::clone(&history) as Arc<dyn Navigator>,
        );
        (client, history)
    }

    /// Make `username` an admin, as `sf-cli admin promote` does.
    ///
    /// # Panics
    ///
    /// Panics if the user does not exist.
    pub async fn promote(&self, username: &str) {
        UserRepository::new(&*self.store)
            .set_role(username, Role::Admin)
            .await
            .expect("Failed to promote user");
    }

    /// Insert a category, as `sf-cli seed` does.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects it.
    pub async fn add_category(&self, name: &str) -> Category {
        let category = Category {
            id: CategoryId::generate(),
            name: name.to_string(),
        };
        CategoryRepository::new(&*self.store)
            .create(&category)
            .await
            .expect("Failed to create category");
        category
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}
