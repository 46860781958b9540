//! MongoDB storage backend.
//!
//! Each project maps to a collection of the same (sanitized) name inside the
//! configured database. Filters and `$set` bodies come from
//! [`crate::query`]; this module only issues the driver calls.

use crate::domain::{now, Issue, IssueChanges, IssueId, NewIssue};
use crate::error::{Error, Result};
use crate::query::{IssueFilter, SORT_FIELD};
use crate::storage::document::IssueDocument;
use crate::storage::IssueStore;
use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};

/// MongoDB-backed issue store.
///
/// Cloning is cheap: the driver client is internally reference-counted and
/// pools its connections.
#[derive(Clone)]
pub struct MongoStorage {
    client: Client,
    database_name: String,
}

impl std::fmt::Debug for MongoStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStorage")
            .field("database_name", &self.database_name)
            .finish_non_exhaustive()
    }
}

impl MongoStorage {
    /// Connect to MongoDB and verify the server answers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the connection string is invalid or the
    /// server does not respond to a ping.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let storage = Self {
            client,
            database_name: database_name.to_string(),
        };
        storage
            .ping()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        tracing::info!(database = %storage.database_name, "Connected to MongoDB");
        Ok(storage)
    }

    fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    fn collection(&self, project: &str) -> Collection<IssueDocument> {
        self.database().collection(project)
    }
}

#[async_trait]
impl IssueStore for MongoStorage {
    async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let cursor = self
            .collection(project)
            .find(filter.to_document())
            .sort(doc! { SORT_FIELD: -1 })
            .await?;

        let documents: Vec<IssueDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Issue::from).collect())
    }

    async fn insert(&self, project: &str, new_issue: NewIssue) -> Result<Issue> {
        let issue = Issue::new(IssueId::generate(), new_issue, now());

        self.collection(project)
            .insert_one(IssueDocument::from(&issue))
            .await?;

        tracing::debug!(project, id = %issue.id, "Inserted issue");
        Ok(issue)
    }

    async fn update(&self, project: &str, id: &IssueId, changes: &IssueChanges) -> Result<bool> {
        let result = self
            .collection(project)
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": changes.to_set_document(now()) },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, project: &str, id: &IssueId) -> Result<bool> {
        let result = self
            .collection(project)
            .delete_one(doc! { "_id": id.object_id() })
            .await?;

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
