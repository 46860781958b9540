//! Integration tests for the MongoDB storage backend.
//!
//! Most tests need a running server and are ignored by default. Run them
//! with the connection string in `DB`:
//!
//! ```sh
//! DB=mongodb://localhost:27017 cargo test -p trackr --test mongo_storage -- --ignored
//! ```
//!
//! Every test works in its own freshly named project collection.

#![cfg(feature = "mongodb")]

use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use trackr::domain::{IssueChanges, IssueId, NewIssue};
use trackr::error::Error;
use trackr::query::{FilterValue, IssueFilter};
use trackr::storage::IssueStore;
use trackr::storage::mongo::MongoStorage;

const DATABASE: &str = "trackr_test";

async fn live_storage() -> Arc<dyn IssueStore> {
    let uri = std::env::var("DB").expect("DB must name a MongoDB server");
    Arc::new(MongoStorage::connect(&uri, DATABASE).await.unwrap())
}

fn fresh_project() -> String {
    format!("test_{}", IssueId::generate())
}

fn create_test_issue(title: &str) -> NewIssue {
    NewIssue {
        issue_title: title.to_string(),
        issue_text: "Text".to_string(),
        created_by: "Created by".to_string(),
        assigned_to: String::new(),
        status_text: String::new(),
    }
}

fn by_id(id: IssueId) -> IssueFilter {
    IssueFilter::new().with("_id", FilterValue::Id(id))
}

// ========== Connection ==========

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let result = MongoStorage::connect(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100&connectTimeoutMS=100",
        DATABASE,
    )
    .await;

    assert!(matches!(result, Err(Error::Connection(_))));
}

#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_ping() {
    live_storage().await.ping().await.unwrap();
}

// ========== CRUD ==========

#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_insert_then_find_by_id() {
    let storage = live_storage().await;
    let project = fresh_project();

    let created = storage
        .insert(&project, create_test_issue("Stored"))
        .await
        .unwrap();
    assert!(created.open);
    assert_eq!(created.created_on, created.updated_on);

    let found = storage.find(&project, &by_id(created.id)).await.unwrap();
    assert_eq!(found, vec![created]);
}

#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_update_reports_match_and_refreshes_updated_on() {
    let storage = live_storage().await;
    let project = fresh_project();
    let created = storage
        .insert(&project, create_test_issue("Original"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let changes = IssueChanges {
        issue_title: Some("Updated".to_string()),
        open: Some(false),
        ..Default::default()
    };
    assert!(storage.update(&project, &created.id, &changes).await.unwrap());

    let stored = storage
        .find(&project, &by_id(created.id))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(stored.issue_title, "Updated");
    assert_eq!(stored.issue_text, "Text");
    assert!(!stored.open);
    assert_eq!(stored.created_on, created.created_on);
    assert!(stored.updated_on > created.updated_on);

    let unknown = storage
        .update(&project, &IssueId::generate(), &changes)
        .await
        .unwrap();
    assert!(!unknown);
}

#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_delete_reports_whether_deleted() {
    let storage = live_storage().await;
    let project = fresh_project();
    let created = storage
        .insert(&project, create_test_issue("Doomed"))
        .await
        .unwrap();

    assert!(storage.delete(&project, &created.id).await.unwrap());
    assert!(storage.find(&project, &by_id(created.id)).await.unwrap().is_empty());
    assert!(!storage.delete(&project, &created.id).await.unwrap());
}

// ========== Query ==========

#[rstest]
#[case::no_filter(&[], 3)]
#[case::one_filter(&[("issue_text", "Text")], 2)]
#[case::two_filters(&[("issue_text", "Text"), ("assigned_to", "Assigned to")], 1)]
#[case::open_empty_means_true(&[("open", "")], 3)]
#[case::closed(&[("open", "false")], 0)]
#[case::empty_id(&[("_id", "")], 0)]
#[case::no_match(&[("created_by", "nobody")], 0)]
#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_find_with_filters(#[case] query: &[(&str, &str)], #[case] expected: usize) {
    let storage = live_storage().await;
    let project = fresh_project();

    let mut full = create_test_issue("Every field filled in");
    full.assigned_to = "Assigned to".to_string();
    storage.insert(&project, full).await.unwrap();
    storage
        .insert(&project, create_test_issue("Required fields filled in"))
        .await
        .unwrap();
    let mut other = create_test_issue("Other");
    other.issue_text = "Something else".to_string();
    storage.insert(&project, other).await.unwrap();

    let filter = IssueFilter::from_query(query.iter().copied()).unwrap();
    let issues = storage.find(&project, &filter).await.unwrap();

    assert_eq!(issues.len(), expected);
}

#[tokio::test]
#[ignore = "requires a MongoDB server in DB"]
async fn test_find_orders_by_updated_on_descending() {
    let storage = live_storage().await;
    let project = fresh_project();

    let first = storage
        .insert(&project, create_test_issue("first"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    storage
        .insert(&project, create_test_issue("second"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let changes = IssueChanges {
        status_text: Some("bumped".to_string()),
        ..Default::default()
    };
    storage.update(&project, &first.id, &changes).await.unwrap();

    let titles: Vec<String> = storage
        .find(&project, &IssueFilter::new())
        .await
        .unwrap()
        .into_iter()
        .map(|issue| issue.issue_title)
        .collect();
    assert_eq!(titles, ["first", "second"]);
}
