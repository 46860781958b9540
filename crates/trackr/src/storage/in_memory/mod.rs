//! In-memory storage backend using per-project maps.
//!
//! This module provides a fast, **ephemeral** storage implementation where all data
//! is held in RAM and **lost when the process exits**. It is suitable for:
//!
//! - Testing and development
//! - Running the server without a document store (`memory://`)
//!
//! # Architecture
//!
//! The implementation uses:
//! - `HashMap<String, Collection>` keyed by project name, created on first insert
//! - `HashMap<IssueId, Issue>` per collection for O(1) lookups by ID
//! - The shared [`IssueFilter`](crate::query::IssueFilter) evaluator for `find`,
//!   so filter semantics match the MongoDB backend
//!
//! # Thread Safety
//!
//! The storage is wrapped in `Arc<Mutex<InMemoryStorageInner>>` to provide thread-safe
//! access in async contexts. All operations acquire the mutex lock, which makes each
//! operation atomic with respect to the others.
//!
//! # Performance Characteristics
//!
//! - Insert, update, delete: O(1)
//! - Find: O(n log n) in the size of the project's collection (scan, then sort)

mod inner;
mod trait_impl;

use crate::storage::IssueStore;
use inner::InMemoryStorageInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory storage.
///
/// This type wraps the inner storage in `Arc<Mutex<>>` for thread-safe
/// async access. It implements [`IssueStore`] via the trait implementation
/// in `trait_impl.rs`.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<InMemoryStorageInner>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage").finish_non_exhaustive()
    }
}

/// Create a new in-memory storage instance.
///
/// # Example
///
/// ```
/// use trackr::storage::in_memory::new_in_memory_storage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage();
///     // Use storage...
/// }
/// ```
pub fn new_in_memory_storage() -> Arc<dyn IssueStore> {
    Arc::new(InMemoryStorage::new())
}
