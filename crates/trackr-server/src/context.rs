//! Shared store handle for request handlers.
//!
//! The store is connected lazily on first use. Concurrent first requests
//! wait on a single connection attempt; a failed attempt leaves the handle
//! empty so the next request retries.

use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;
use trackr::error::Result;
use trackr::storage::{IssueStore, StorageBackend, create_storage};

/// Lazily connected handle to the issue store.
///
/// Cloning is cheap and every clone shares the same connection.
#[derive(Clone)]
pub struct StoreHandle {
    backend: StorageBackend,
    store: Arc<OnceCell<Arc<dyn IssueStore>>>,
}

impl StoreHandle {
    /// Create a handle that connects to `backend` on first use.
    #[must_use]
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            store: Arc::new(OnceCell::new()),
        }
    }

    /// Create a handle around an already constructed store.
    #[must_use]
    pub fn with_store(store: Arc<dyn IssueStore>) -> Self {
        Self {
            backend: StorageBackend::InMemory,
            store: Arc::new(OnceCell::from(store)),
        }
    }

    /// Get the store, connecting if this is the first use.
    ///
    /// # Errors
    ///
    /// Returns the connection error if the store cannot be reached. The
    /// failure is not remembered.
    pub async fn get(&self) -> Result<Arc<dyn IssueStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                info!(backend = self.backend.kind(), "Connecting to issue store");
                create_storage(self.backend.clone()).await
            })
            .await?;
        Ok(Arc::clone(store))
    }

    /// Returns `true` once a connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("backend", &self.backend)
            .field("connected", &self.is_connected())
            .finish()
    }
}
