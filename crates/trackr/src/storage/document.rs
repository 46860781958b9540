//! Stored (BSON) form of an issue.
//!
//! The domain [`Issue`] serializes to JSON with a hex `_id` and RFC 3339
//! timestamps. In the store the same fields keep their native types: an
//! object id and BSON dates. This record is that stored shape.

use crate::domain::Issue;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An issue as persisted in a project collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    pub open: bool,
    pub created_on: bson::DateTime,
    pub updated_on: bson::DateTime,
}

impl From<&Issue> for IssueDocument {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.object_id(),
            issue_title: issue.issue_title.clone(),
            issue_text: issue.issue_text.clone(),
            created_by: issue.created_by.clone(),
            assigned_to: issue.assigned_to.clone(),
            status_text: issue.status_text.clone(),
            open: issue.open,
            created_on: to_bson_date(issue.created_on),
            updated_on: to_bson_date(issue.updated_on),
        }
    }
}

impl From<IssueDocument> for Issue {
    fn from(doc: IssueDocument) -> Self {
        Self {
            id: doc.id.into(),
            issue_title: doc.issue_title,
            issue_text: doc.issue_text,
            created_by: doc.created_by,
            assigned_to: doc.assigned_to,
            status_text: doc.status_text,
            open: doc.open,
            created_on: from_bson_date(doc.created_on),
            updated_on: from_bson_date(doc.updated_on),
        }
    }
}

/// Convert a timestamp to a BSON date (millisecond precision).
pub fn to_bson_date(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

/// Convert a BSON date back to a timestamp.
///
/// Dates outside chrono's range clamp to the Unix epoch.
pub fn from_bson_date(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{now, IssueId, NewIssue};

    #[test]
    fn test_document_conversion_preserves_issue() {
        let issue = Issue::new(
            IssueId::generate(),
            NewIssue {
                issue_title: "Title".to_string(),
                issue_text: "Text".to_string(),
                created_by: "alice".to_string(),
                assigned_to: String::new(),
                status_text: "new".to_string(),
            },
            now(),
        );

        let restored = Issue::from(IssueDocument::from(&issue));
        assert_eq!(restored, issue);
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let raw = bson::doc! {
            "_id": ObjectId::new(),
            "issue_title": "Title",
            "issue_text": "Text",
            "created_by": "alice",
            "open": true,
            "created_on": bson::DateTime::now(),
            "updated_on": bson::DateTime::now(),
        };

        let doc: IssueDocument = bson::from_document(raw).unwrap();
        assert_eq!(doc.assigned_to, "");
        assert_eq!(doc.status_text, "");
    }
}
