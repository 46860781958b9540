//! Error types for the trackr HTTP server.

use crate::models::ErrorBody;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file could not be parsed.
    #[error("Invalid config file {path}: {source}")]
    ConfigFile {
        /// Path of the offending file.
        path: String,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An error from the trackr core.
    #[error(transparent)]
    Trackr(#[from] trackr::error::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single API request.
///
/// Handled outcomes (missing fields, unknown ids) are answered with status
/// 200 and an `{error}` body, the contract existing clients rely on. Only
/// store failures and unparseable requests use error statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A create request lacked one of the required fields.
    #[error("required field(s) missing")]
    MissingRequiredField,

    /// An update or delete request lacked `_id`.
    #[error("missing _id")]
    MissingIdentifier,

    /// An update request had `_id` and nothing else.
    #[error("no update field(s) sent")]
    NoUpdateFields {
        /// Identifier as supplied.
        id: String,
    },

    /// The identifier was malformed or matched no issue.
    #[error("could not update")]
    UpdateFailed {
        /// Identifier as supplied.
        id: String,
    },

    /// The identifier was malformed or matched no issue.
    #[error("could not delete")]
    DeleteFailed {
        /// Identifier as supplied.
        id: String,
    },

    /// The store failed. The detail is logged, never returned.
    #[error("store error")]
    Store(#[source] trackr::error::Error),

    /// The request body could not be parsed.
    #[error("invalid request body")]
    InvalidBody(String),

    /// The query string could not be parsed.
    #[error("invalid query string")]
    InvalidQuery(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidBody(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::MissingRequiredField
            | Self::MissingIdentifier
            | Self::NoUpdateFields { .. }
            | Self::UpdateFailed { .. }
            | Self::DeleteFailed { .. } => StatusCode::OK,
        }
    }

    fn echoed_id(&self) -> Option<&str> {
        match self {
            Self::NoUpdateFields { id } | Self::UpdateFailed { id } | Self::DeleteFailed { id } => {
                Some(id.as_str())
            }
            _ => None,
        }
    }
}

impl From<trackr::error::Error> for ApiError {
    fn from(err: trackr::error::Error) -> Self {
        use trackr::error::Error as Core;

        match err {
            Core::MissingRequiredField => Self::MissingRequiredField,
            Core::MissingIdentifier => Self::MissingIdentifier,
            Core::NoUpdateFields { id } => Self::NoUpdateFields { id },
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store(source) => tracing::error!(error = %source, "Store operation failed"),
            Self::InvalidBody(detail) => tracing::debug!(%detail, "Rejected request body"),
            Self::InvalidQuery(detail) => tracing::debug!(%detail, "Rejected query string"),
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
            id: self.echoed_id().map(str::to_string),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
