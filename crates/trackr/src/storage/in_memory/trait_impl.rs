//! IssueStore trait implementation for in-memory storage.

use super::InMemoryStorage;
use crate::domain::{now, Issue, IssueChanges, IssueId, NewIssue};
use crate::error::Result;
use crate::query::IssueFilter;
use crate::storage::IssueStore;
use async_trait::async_trait;

#[async_trait]
impl IssueStore for InMemoryStorage {
    async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let inner = self.inner.lock().await;

        let Some(collection) = inner.collection(project) else {
            return Ok(Vec::new());
        };

        let mut issues = Vec::new();
        for issue in collection.values() {
            if filter.matches(issue)? {
                issues.push(issue.clone());
            }
        }

        // Most recently updated first; ID as tiebreaker keeps the order stable
        // for issues touched within the same millisecond.
        issues.sort_by(|a, b| b.updated_on.cmp(&a.updated_on).then(b.id.cmp(&a.id)));
        Ok(issues)
    }

    async fn insert(&self, project: &str, new_issue: NewIssue) -> Result<Issue> {
        let mut inner = self.inner.lock().await;

        let issue = Issue::new(IssueId::generate(), new_issue, now());
        inner
            .collection_or_create(project)
            .insert(issue.id, issue.clone());

        tracing::debug!(project, id = %issue.id, "Inserted issue");
        Ok(issue)
    }

    async fn update(&self, project: &str, id: &IssueId, changes: &IssueChanges) -> Result<bool> {
        let mut inner = self.inner.lock().await;

        let Some(issue) = inner
            .collection_mut(project)
            .and_then(|collection| collection.get_mut(id))
        else {
            return Ok(false);
        };

        issue.apply(changes, now());
        Ok(true)
    }

    async fn delete(&self, project: &str, id: &IssueId) -> Result<bool> {
        let mut inner = self.inner.lock().await;

        Ok(inner
            .collection_mut(project)
            .and_then(|collection| collection.remove(id))
            .is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterValue;

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            issue_title: title.to_string(),
            issue_text: "Text".to_string(),
            created_by: "alice".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
        }
    }

    #[tokio::test]
    async fn test_projects_are_isolated() {
        let storage = InMemoryStorage::new();
        let issue = storage.insert("alpha", new_issue("A")).await.unwrap();

        assert!(storage
            .find("beta", &IssueFilter::new())
            .await
            .unwrap()
            .is_empty());
        assert!(!storage
            .update("beta", &issue.id, &IssueChanges::default())
            .await
            .unwrap());
        assert!(!storage.delete("beta", &issue.id).await.unwrap());
        assert_eq!(
            storage
                .find("alpha", &IssueFilter::new())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_on_only() {
        let storage = InMemoryStorage::new();
        let issue = storage.insert("alpha", new_issue("A")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let changes = IssueChanges {
            open: Some(false),
            ..Default::default()
        };
        assert!(storage.update("alpha", &issue.id, &changes).await.unwrap());

        let filter = IssueFilter::new().with("_id", FilterValue::Id(issue.id));
        let stored = storage.find("alpha", &filter).await.unwrap().remove(0);
        assert!(!stored.open);
        assert_eq!(stored.created_on, issue.created_on);
        assert!(stored.updated_on > issue.updated_on);
    }
}
