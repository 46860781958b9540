//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{Issue, IssueId};
use std::collections::HashMap;

/// One project's issues.
pub(super) type Collection = HashMap<IssueId, Issue>;

/// Inner storage structure (not thread-safe).
#[derive(Debug, Default)]
pub(super) struct InMemoryStorageInner {
    /// Collections indexed by (sanitized) project name
    collections: HashMap<String, Collection>,
}

impl InMemoryStorageInner {
    /// The project's collection, if anything was ever inserted into it.
    pub(super) fn collection(&self, project: &str) -> Option<&Collection> {
        self.collections.get(project)
    }

    /// Mutable access to the project's collection, if it exists.
    pub(super) fn collection_mut(&mut self, project: &str) -> Option<&mut Collection> {
        self.collections.get_mut(project)
    }

    /// The project's collection, created on demand.
    ///
    /// Collections spring into existence on first insert, the way a document
    /// store creates them.
    pub(super) fn collection_or_create(&mut self, project: &str) -> &mut Collection {
        self.collections.entry(project.to_string()).or_default()
    }
}
