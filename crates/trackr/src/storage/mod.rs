//! Storage abstraction layer for trackr.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends. Issues live in one collection per project. It supports
//! multiple implementations:
//!
//! - **In-memory**: Fast, ephemeral storage backed by per-project maps
//! - **MongoDB**: Persistent document store, one collection per project
//!
//! # Architecture
//!
//! The storage layer uses an async trait so both the in-memory map and the
//! network-bound MongoDB driver fit behind the same interface. The trait is
//! object-safe and every method takes `&self`, so a single
//! `Arc<dyn IssueStore>` can be shared across concurrent request handlers.
//! Each method is one store operation with the store's single-document
//! atomicity; nothing spans documents.
//!
//! # Test Utilities
//!
//! This module provides a [`MockStorage`] implementation whose operations
//! always fail, for testing how callers surface store failures. Enable the
//! `test-util` feature to use it from another crate:
//!
//! ```toml
//! [dev-dependencies]
//! trackr = { version = "...", features = ["test-util"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use trackr::domain::NewIssue;
//! use trackr::query::IssueFilter;
//! use trackr::storage::{create_storage, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = create_storage(StorageBackend::InMemory).await?;
//!
//!     let issue = storage
//!         .insert(
//!             "apitest",
//!             NewIssue {
//!                 issue_title: "Fix login".to_string(),
//!                 issue_text: "The login form rejects valid passwords".to_string(),
//!                 created_by: "alice".to_string(),
//!                 assigned_to: String::new(),
//!                 status_text: String::new(),
//!             },
//!         )
//!         .await?;
//!     println!("Created issue: {}", issue.id);
//!
//!     let all = storage.find("apitest", &IssueFilter::new()).await?;
//!     assert_eq!(all.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::domain::{Issue, IssueChanges, IssueId, NewIssue};
use crate::error::{Error, Result};
use crate::query::IssueFilter;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub(crate) mod document;
pub mod in_memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

/// Core storage trait for issue management.
///
/// # Method Categories
///
/// - **CRUD**: `find`, `insert`, `update`, `delete`
/// - **Health**: `ping`
///
/// # Error Handling
///
/// "Nothing matched" is not an error: `update` and `delete` report it through
/// their `bool` return. Errors are reserved for the store itself failing
/// (`Error::Storage`, `Error::Connection`, `Error::Serialization`).
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Find all issues in `project` matching `filter`.
    ///
    /// Results are ordered by `updated_on`, most recent first. An empty
    /// result is not an error.
    async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Insert a new issue into `project`.
    ///
    /// Assigns a fresh ID, sets `open = true`, and sets `created_on` and
    /// `updated_on` to the same instant. Returns the stored issue.
    async fn insert(&self, project: &str, issue: NewIssue) -> Result<Issue>;

    /// Apply `changes` to the issue with `id` in `project`.
    ///
    /// Fields not present in `changes` are left untouched; `updated_on` is
    /// refreshed. Returns `false` if no issue matched.
    async fn update(&self, project: &str, id: &IssueId, changes: &IssueChanges) -> Result<bool>;

    /// Delete the issue with `id` from `project`.
    ///
    /// Returns `false` if no issue was deleted.
    async fn delete(&self, project: &str, id: &IssueId) -> Result<bool>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Default database name for document-store backends.
pub const DEFAULT_DATABASE_NAME: &str = "issuetracker";

/// Connection string selecting the in-memory backend.
pub const MEMORY_URL: &str = "memory://";

/// Storage backend configuration.
///
/// Determines which storage implementation to use.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// MongoDB (persistent)
    MongoDb {
        /// Connection string, e.g. `mongodb://localhost:27017`
        uri: String,
        /// Database holding the per-project collections
        database: String,
    },
}

impl StorageBackend {
    /// Select a backend from a connection string.
    ///
    /// - `memory://` (or an empty string) selects [`StorageBackend::InMemory`]
    /// - `mongodb://` and `mongodb+srv://` select [`StorageBackend::MongoDb`]
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for any other scheme.
    pub fn parse(url: &str, database: impl Into<String>) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() || url == MEMORY_URL || url == "memory" {
            return Ok(Self::InMemory);
        }
        if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
            let database = database.into();
            if database.trim().is_empty() {
                return Err(Error::Config("database name cannot be empty".to_string()));
            }
            return Ok(Self::MongoDb {
                uri: url.to_string(),
                database,
            });
        }

        let scheme = url.split("://").next().unwrap_or(url);
        Err(Error::Config(format!(
            "unsupported storage scheme '{scheme}' (expected memory:// or mongodb://)"
        )))
    }

    /// Short backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::MongoDb { .. } => "mongodb",
        }
    }
}

// The URI may embed credentials, so it never appears in debug output.
impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::MongoDb { database, .. } => f
                .debug_struct("MongoDb")
                .field("uri", &"<redacted>")
                .field("database", database)
                .finish(),
        }
    }
}

/// Create a storage instance for the given backend.
///
/// This factory function returns a trait object that can be used
/// polymorphically regardless of the backend implementation. For MongoDB it
/// connects and pings the server, so an unreachable store fails here.
///
/// # Errors
///
/// - `Error::Connection` if the MongoDB server cannot be reached
/// - `Error::Config` if MongoDB support was compiled out
pub async fn create_storage(backend: StorageBackend) -> Result<Arc<dyn IssueStore>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        #[cfg(feature = "mongodb")]
        StorageBackend::MongoDb { uri, database } => {
            let store = mongo::MongoStorage::connect(&uri, &database).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::MongoDb { .. } => Err(Error::Config(
            "MongoDB support is not enabled in this build".to_string(),
        )),
    }
}

// ========== Test Utilities ==========

/// Error message returned by every [`MockStorage`] operation.
#[cfg(any(test, feature = "test-util"))]
pub const MOCK_FAILURE: &str = "mock storage failure";

/// Mock implementation of [`IssueStore`] for testing failure paths.
///
/// Every operation fails with `Error::Storage(MOCK_FAILURE)`. Use it to
/// verify that callers turn store failures into stable error responses
/// without leaking the underlying message.
///
/// **Use [`in_memory::new_in_memory_storage`]** when you need working CRUD.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct MockStorage;

#[cfg(any(test, feature = "test-util"))]
impl MockStorage {
    /// Create a new MockStorage instance.
    pub fn new() -> Self {
        Self
    }

    fn failure() -> Error {
        Error::Storage(MOCK_FAILURE.to_string())
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl IssueStore for MockStorage {
    async fn find(&self, _project: &str, _filter: &IssueFilter) -> Result<Vec<Issue>> {
        Err(Self::failure())
    }

    async fn insert(&self, _project: &str, _issue: NewIssue) -> Result<Issue> {
        Err(Self::failure())
    }

    async fn update(
        &self,
        _project: &str,
        _id: &IssueId,
        _changes: &IssueChanges,
    ) -> Result<bool> {
        Err(Self::failure())
    }

    async fn delete(&self, _project: &str, _id: &IssueId) -> Result<bool> {
        Err(Self::failure())
    }

    async fn ping(&self) -> Result<()> {
        Err(Self::failure())
    }
}
