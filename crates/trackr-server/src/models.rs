//! Response payloads.
//!
//! Issues themselves serialize straight from [`trackr::domain::Issue`]; the
//! types here cover the acknowledgement and error bodies around them.

use serde::{Deserialize, Serialize};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Fixed, client-facing error message.
    pub error: String,

    /// Identifier the request referred to, when it had one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Acknowledgement of a successful update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// What happened.
    pub result: String,

    /// Identifier the request referred to.
    #[serde(rename = "_id")]
    pub id: String,
}

impl ActionResult {
    /// Acknowledge an update.
    #[must_use]
    pub fn updated(id: String) -> Self {
        Self {
            result: "successfully updated".to_string(),
            id,
        }
    }

    /// Acknowledge a delete.
    #[must_use]
    pub fn deleted(id: String) -> Self {
        Self {
            result: "successfully deleted".to_string(),
            id,
        }
    }
}

/// Liveness and readiness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, `ready` or `unavailable`.
    pub status: String,
}

impl HealthStatus {
    pub(crate) fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_omits_missing_id() {
        let body = ErrorBody {
            error: "missing _id".to_string(),
            id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "error": "missing _id" })
        );
    }

    #[test]
    fn test_action_result_shape() {
        let body = ActionResult::deleted("abc".to_string());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "result": "successfully deleted", "_id": "abc" })
        );
    }
}
