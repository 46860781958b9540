//! Typed parsing of untrusted request fields.
//!
//! Request bodies arrive as flat string maps. Nothing here iterates over the
//! caller's keys: each operation reads the fields it knows about by name,
//! sanitizes them one by one, and ignores everything else.

use crate::domain::{IssueChanges, IssueId, NewIssue};
use crate::error::{Error, Result};
use crate::sanitize::{in_html_data, sanitize_field};
use std::collections::BTreeMap;

/// Name of the identifier field in request bodies and responses.
pub const ID_FIELD: &str = "_id";

/// Title field name.
pub const ISSUE_TITLE: &str = "issue_title";
/// Description field name.
pub const ISSUE_TEXT: &str = "issue_text";
/// Reporter field name.
pub const CREATED_BY: &str = "created_by";
/// Assignee field name.
pub const ASSIGNED_TO: &str = "assigned_to";
/// Status note field name.
pub const STATUS_TEXT: &str = "status_text";
/// Open flag field name.
pub const OPEN: &str = "open";

/// Flat key/value fields of a request body.
///
/// A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field was sent.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sanitized, non-empty value of a field.
    fn sanitized(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .and_then(sanitize_field)
            .filter(|v| !v.is_empty())
    }

    /// Sanitized identifier, kept as a string so it can be echoed back even
    /// when it is not a valid id.
    fn identifier(&self) -> Result<String> {
        self.get(ID_FIELD)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| in_html_data(v).into_owned())
            .ok_or(Error::MissingIdentifier)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl NewIssue {
    /// Build a new issue from request fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingRequiredField` unless `issue_title`,
    /// `issue_text` and `created_by` are all present and non-empty after
    /// sanitization.
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        let (Some(issue_title), Some(issue_text), Some(created_by)) = (
            fields.sanitized(ISSUE_TITLE),
            fields.sanitized(ISSUE_TEXT),
            fields.sanitized(CREATED_BY),
        ) else {
            return Err(Error::MissingRequiredField);
        };

        Ok(Self {
            issue_title,
            issue_text,
            created_by,
            assigned_to: fields.sanitized(ASSIGNED_TO).unwrap_or_default(),
            status_text: fields.sanitized(STATUS_TEXT).unwrap_or_default(),
        })
    }
}

/// A parsed update request: the target identifier and what to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Identifier as supplied (sanitized, not yet coerced).
    pub id: String,

    /// Fields to change.
    pub changes: IssueChanges,
}

impl UpdateRequest {
    /// Parse an update request.
    ///
    /// Empty fields are dropped rather than cleared. `open` accepts only
    /// `true`/`false`; any other value is ignored.
    ///
    /// # Errors
    ///
    /// - `Error::MissingIdentifier` if `_id` is absent or empty
    /// - `Error::NoUpdateFields` if nothing is left to change
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        let id = fields.identifier()?;

        let open = fields.get(OPEN).filter(|v| !v.is_empty()).and_then(|v| {
            let parsed = parse_bool(v);
            if parsed.is_none() {
                tracing::debug!(value = %v, "Ignoring unrecognized open value");
            }
            parsed
        });

        let changes = IssueChanges {
            issue_title: fields.sanitized(ISSUE_TITLE),
            issue_text: fields.sanitized(ISSUE_TEXT),
            created_by: fields.sanitized(CREATED_BY),
            assigned_to: fields.sanitized(ASSIGNED_TO),
            status_text: fields.sanitized(STATUS_TEXT),
            open,
        };

        if changes.is_empty() {
            return Err(Error::NoUpdateFields { id });
        }

        Ok(Self { id, changes })
    }

    /// Coerce the identifier to an [`IssueId`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if the identifier is malformed.
    pub fn issue_id(&self) -> Result<IssueId> {
        IssueId::parse(&self.id)
    }
}

/// A parsed delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Identifier as supplied (sanitized, not yet coerced).
    pub id: String,
}

impl DeleteRequest {
    /// Parse a delete request.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentifier` if `_id` is absent or empty.
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        Ok(Self {
            id: fields.identifier()?,
        })
    }

    /// Coerce the identifier to an [`IssueId`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if the identifier is malformed.
    pub fn issue_id(&self) -> Result<IssueId> {
        IssueId::parse(&self.id)
    }
}

/// Parse a boolean form value (`true`/`false`, case-insensitive).
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
