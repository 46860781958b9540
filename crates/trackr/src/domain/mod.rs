//! Domain types for issue tracking.
//!
//! This module contains the core domain types for the trackr issue tracker.
//! JSON is the wire shape: identifiers render as 24-character hex strings and
//! timestamps as RFC 3339 strings.

use crate::error::{Error, Result};
use bson::oid::ObjectId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an issue.
///
/// Wraps the store's native 12-byte object id. Parsing from a string is the
/// only way to coerce caller input, and fails on anything that is not a
/// 24-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(ObjectId);

impl IssueId {
    /// Generate a fresh, unique issue ID.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse an issue ID from its hex representation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if `s` is not a valid object id.
    pub fn parse(s: &str) -> Result<Self> {
        ObjectId::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }

    /// The underlying object id.
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for IssueId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for IssueId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for IssueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for IssueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Represents an issue in the tracking system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier, assigned on creation
    #[serde(rename = "_id")]
    pub id: IssueId,

    /// Issue title
    pub issue_title: String,

    /// Issue description
    pub issue_text: String,

    /// Reporter
    pub created_by: String,

    /// Assignee, empty when unassigned
    #[serde(default)]
    pub assigned_to: String,

    /// Free-form status note, empty when unset
    #[serde(default)]
    pub status_text: String,

    /// Whether the issue is unresolved
    pub open: bool,

    /// Creation timestamp
    pub created_on: DateTime<Utc>,

    /// Last update timestamp
    pub updated_on: DateTime<Utc>,
}

impl Issue {
    /// Build a freshly created issue from validated input.
    ///
    /// Both timestamps are set to the same instant.
    pub fn new(id: IssueId, new_issue: NewIssue, now: DateTime<Utc>) -> Self {
        Self {
            id,
            issue_title: new_issue.issue_title,
            issue_text: new_issue.issue_text,
            created_by: new_issue.created_by,
            assigned_to: new_issue.assigned_to,
            status_text: new_issue.status_text,
            open: true,
            created_on: now,
            updated_on: now,
        }
    }

    /// Merge `changes` into this issue and refresh `updated_on`.
    ///
    /// Fields absent from `changes` are left untouched.
    pub fn apply(&mut self, changes: &IssueChanges, now: DateTime<Utc>) {
        if let Some(title) = &changes.issue_title {
            self.issue_title.clone_from(title);
        }
        if let Some(text) = &changes.issue_text {
            self.issue_text.clone_from(text);
        }
        if let Some(created_by) = &changes.created_by {
            self.created_by.clone_from(created_by);
        }
        if let Some(assigned_to) = &changes.assigned_to {
            self.assigned_to.clone_from(assigned_to);
        }
        if let Some(status_text) = &changes.status_text {
            self.status_text.clone_from(status_text);
        }
        if let Some(open) = changes.open {
            self.open = open;
        }
        self.updated_on = now;
    }
}

/// Validated, sanitized data for creating a new issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title (non-empty)
    pub issue_title: String,

    /// Issue description (non-empty)
    pub issue_text: String,

    /// Reporter (non-empty)
    pub created_by: String,

    /// Assignee, `""` when not supplied
    pub assigned_to: String,

    /// Status note, `""` when not supplied
    pub status_text: String,
}

/// Partial update of an existing issue.
///
/// `None` means "leave the stored value alone"; there is no way to clear a
/// field through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueChanges {
    /// New title (if updating)
    pub issue_title: Option<String>,

    /// New description (if updating)
    pub issue_text: Option<String>,

    /// New reporter (if updating)
    pub created_by: Option<String>,

    /// New assignee (if updating)
    pub assigned_to: Option<String>,

    /// New status note (if updating)
    pub status_text: Option<String>,

    /// Close (`false`) or reopen (`true`) the issue
    pub open: Option<bool>,
}

impl IssueChanges {
    /// Returns `true` if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

/// Current time truncated to the store's millisecond date precision.
///
/// Using this everywhere keeps the echoed response identical to what a later
/// read returns.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_issue() -> NewIssue {
        NewIssue {
            issue_title: "Title".to_string(),
            issue_text: "Text".to_string(),
            created_by: "alice".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
        }
    }

    #[test]
    fn test_issue_id_roundtrips_through_hex() {
        let id = IssueId::generate();
        let parsed: IssueId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_issue_id_rejects_malformed_input() {
        assert!(matches!(IssueId::parse("104729"), Err(Error::InvalidId(s)) if s == "104729"));
        assert!(IssueId::parse("").is_err());
        assert!(IssueId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_new_issue_is_open_with_equal_timestamps() {
        let now = now();
        let issue = Issue::new(IssueId::generate(), sample_new_issue(), now);

        assert!(issue.open);
        assert_eq!(issue.created_on, issue.updated_on);
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let created = now();
        let mut issue = Issue::new(IssueId::generate(), sample_new_issue(), created);
        let later = created + chrono::Duration::seconds(5);

        let changes = IssueChanges {
            status_text: Some("triaged".to_string()),
            open: Some(false),
            ..Default::default()
        };
        issue.apply(&changes, later);

        assert_eq!(issue.issue_title, "Title");
        assert_eq!(issue.status_text, "triaged");
        assert!(!issue.open);
        assert_eq!(issue.created_on, created);
        assert_eq!(issue.updated_on, later);
    }

    #[test]
    fn test_issue_json_shape() {
        let issue = Issue::new(IssueId::generate(), sample_new_issue(), now());
        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["_id"], issue.id.to_string());
        assert_eq!(json["open"], true);
        assert_eq!(json["assigned_to"], "");
        assert!(json["created_on"].is_string());
    }

    #[test]
    fn test_empty_changes() {
        assert!(IssueChanges::default().is_empty());
        let changes = IssueChanges {
            open: Some(true),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
