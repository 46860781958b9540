//! Translation of request parameters into store filter and update documents.
//!
//! Both storage backends consume the documents built here, so an in-memory
//! `find` and a MongoDB `find` agree on what a query matches.

use crate::domain::{Issue, IssueChanges, IssueId};
use crate::error::Result;
use crate::input::{
    ASSIGNED_TO, CREATED_BY, ID_FIELD, ISSUE_TEXT, ISSUE_TITLE, OPEN, STATUS_TEXT,
};
use crate::storage::document::IssueDocument;
use bson::{Bson, Document};
use chrono::{DateTime, Utc};

/// Name of the field results are ordered by (descending).
pub const SORT_FIELD: &str = "updated_on";

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Exact match on an issue identifier.
    Id(IssueId),

    /// Exact match on a boolean field.
    Bool(bool),

    /// Exact match on a string value.
    Text(String),
}

impl From<&FilterValue> for Bson {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Id(id) => Bson::ObjectId(id.object_id()),
            FilterValue::Bool(b) => Bson::Boolean(*b),
            FilterValue::Text(s) => Bson::String(s.clone()),
        }
    }
}

/// Conjunction of exact-match terms.
///
/// An empty filter matches every issue in the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    terms: Vec<(String, FilterValue)>,
}

impl IssueFilter {
    /// Create a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from query-string pairs.
    ///
    /// - a non-empty `_id` is coerced to an [`IssueId`]
    /// - `open` of `"true"` or `""` means `true`, `"false"` means `false`;
    ///   any other value stays a literal string
    /// - everything else is an exact string match
    ///
    /// Keys starting with `$` are operator syntax for the store and are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if `_id` is malformed.
    pub fn from_query<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut filter = Self::new();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();

            if key.starts_with('$') {
                tracing::warn!(key = %key, "Skipping operator key in issue filter");
                continue;
            }

            let value = match key.as_str() {
                // An empty id is not coerced; it stays a literal and matches nothing
                ID_FIELD if value.is_empty() => FilterValue::Text(value),
                ID_FIELD => FilterValue::Id(IssueId::parse(&value)?),
                OPEN => match value.as_str() {
                    "" | "true" => FilterValue::Bool(true),
                    "false" => FilterValue::Bool(false),
                    _ => FilterValue::Text(value),
                },
                _ => FilterValue::Text(value),
            };
            filter = filter.with(key, value);
        }

        Ok(filter)
    }

    /// Add a term, replacing an existing term on the same field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        let field = field.into();
        match self.terms.iter_mut().find(|(f, _)| *f == field) {
            Some(term) => term.1 = value,
            None => self.terms.push((field, value)),
        }
        self
    }

    /// The filter's terms, in insertion order.
    pub fn terms(&self) -> &[(String, FilterValue)] {
        &self.terms
    }

    /// Returns `true` if the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Render the filter as a store query document.
    pub fn to_document(&self) -> Document {
        self.terms
            .iter()
            .map(|(field, value)| (field.clone(), Bson::from(value)))
            .collect()
    }

    /// Evaluate the filter against an issue's stored form.
    ///
    /// A term on a field the document does not have never matches.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the issue cannot be converted to a
    /// document.
    pub fn matches(&self, issue: &Issue) -> Result<bool> {
        if self.terms.is_empty() {
            return Ok(true);
        }
        let document = bson::to_document(&IssueDocument::from(issue))?;
        Ok(self
            .terms
            .iter()
            .all(|(field, value)| document.get(field) == Some(&Bson::from(value))))
    }
}

impl IssueChanges {
    /// Render the changes as the body of a `$set` update.
    ///
    /// `updated_on` is always included.
    pub fn to_set_document(&self, updated_on: DateTime<Utc>) -> Document {
        let mut set = Document::new();
        let strings = [
            (ISSUE_TITLE, &self.issue_title),
            (ISSUE_TEXT, &self.issue_text),
            (CREATED_BY, &self.created_by),
            (ASSIGNED_TO, &self.assigned_to),
            (STATUS_TEXT, &self.status_text),
        ];
        for (field, value) in strings {
            if let Some(value) = value {
                set.insert(field, value.clone());
            }
        }
        if let Some(open) = self.open {
            set.insert(OPEN, open);
        }
        set.insert(
            SORT_FIELD,
            bson::DateTime::from_millis(updated_on.timestamp_millis()),
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{now, NewIssue};
    use crate::error::Error;
    use bson::doc;
    use rstest::rstest;

    fn issue() -> Issue {
        Issue::new(
            IssueId::generate(),
            NewIssue {
                issue_title: "Title".to_string(),
                issue_text: "Text".to_string(),
                created_by: "alice".to_string(),
                assigned_to: "bob".to_string(),
                status_text: String::new(),
            },
            now(),
        )
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let filter = IssueFilter::from_query(Vec::<(String, String)>::new()).unwrap();
        assert!(filter.is_empty());
        assert!(filter.to_document().is_empty());
        assert!(filter.matches(&issue()).unwrap());
    }

    #[rstest]
    #[case::empty_is_true("", FilterValue::Bool(true))]
    #[case::true_string("true", FilterValue::Bool(true))]
    #[case::false_string("false", FilterValue::Bool(false))]
    #[case::literal("yes", FilterValue::Text("yes".to_string()))]
    fn test_open_coercion(#[case] raw: &str, #[case] expected: FilterValue) {
        let filter = IssueFilter::from_query([("open", raw)]).unwrap();
        assert_eq!(filter.terms(), &[("open".to_string(), expected)]);
    }

    #[test]
    fn test_id_coercion() {
        let id = IssueId::generate();
        let filter = IssueFilter::from_query([("_id".to_string(), id.to_string())]).unwrap();
        assert_eq!(filter.to_document(), doc! { "_id": id.object_id() });
    }

    #[test]
    fn test_malformed_id_is_rejected() {
        let result = IssueFilter::from_query([("_id", "104729")]);
        assert!(matches!(result, Err(Error::InvalidId(_))));
    }

    #[test]
    fn test_empty_id_is_a_literal_term() {
        let filter = IssueFilter::from_query([("_id", "")]).unwrap();
        assert_eq!(
            filter.terms(),
            &[("_id".to_string(), FilterValue::Text(String::new()))]
        );
        assert!(!filter.matches(&issue()).unwrap());
    }

    #[test]
    fn test_operator_keys_are_skipped() {
        let filter = IssueFilter::from_query([("$where", "sleep(100)"), ("issue_text", "x")])
            .unwrap();
        assert_eq!(filter.to_document(), doc! { "issue_text": "x" });
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let filter =
            IssueFilter::from_query([("created_by", "alice"), ("created_by", "bob")]).unwrap();
        assert_eq!(filter.to_document(), doc! { "created_by": "bob" });
    }

    #[test]
    fn test_matches_is_conjunction() {
        let issue = issue();

        let both = IssueFilter::from_query([("issue_text", "Text"), ("assigned_to", "bob")])
            .unwrap();
        assert!(both.matches(&issue).unwrap());

        let one_wrong =
            IssueFilter::from_query([("issue_text", "Text"), ("assigned_to", "carol")]).unwrap();
        assert!(!one_wrong.matches(&issue).unwrap());
    }

    #[test]
    fn test_matches_by_id_and_open() {
        let issue = issue();

        let by_id = IssueFilter::new().with("_id", FilterValue::Id(issue.id));
        assert!(by_id.matches(&issue).unwrap());

        let open = IssueFilter::from_query([("open", "true")]).unwrap();
        assert!(open.matches(&issue).unwrap());

        let literal = IssueFilter::from_query([("open", "yes")]).unwrap();
        assert!(!literal.matches(&issue).unwrap());
    }

    #[test]
    fn test_unknown_field_never_matches() {
        let filter = IssueFilter::from_query([("priority", "high")]).unwrap();
        assert!(!filter.matches(&issue()).unwrap());
    }

    #[test]
    fn test_set_document_contains_only_changed_fields() {
        let updated_on = now();
        let changes = IssueChanges {
            issue_title: Some("New".to_string()),
            open: Some(false),
            ..Default::default()
        };

        let set = changes.to_set_document(updated_on);
        assert_eq!(
            set,
            doc! {
                "issue_title": "New",
                "open": false,
                "updated_on": bson::DateTime::from_millis(updated_on.timestamp_millis()),
            }
        );
    }
}
