//! Error types for trackr operations.

use thiserror::Error;

/// The error type for trackr operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied value cannot be coerced to an issue identifier.
    #[error("Invalid issue id: {0:?}")]
    InvalidId(String),

    /// One of `issue_title`, `issue_text` or `created_by` is missing or empty.
    #[error("required field(s) missing")]
    MissingRequiredField,

    /// An update or delete request did not carry an `_id`.
    #[error("missing _id")]
    MissingIdentifier,

    /// An update request carried an `_id` but nothing to change.
    #[error("no update field(s) sent")]
    NoUpdateFields {
        /// The identifier as supplied by the caller.
        id: String,
    },

    /// The document store rejected or failed an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The document store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document could not be converted to or from its stored form.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns `true` for failures of the document store itself, as opposed
    /// to problems with the caller's input.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::Connection(_) | Error::Serialization(_)
        )
    }
}

impl From<bson::ser::Error> for Error {
    fn from(err: bson::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for Error {
    fn from(err: bson::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match *err.kind {
            ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
                Error::Connection(err.to_string())
            }
            _ => Error::Storage(err.to_string()),
        }
    }
}

/// A specialized Result type for trackr operations.
pub type Result<T> = std::result::Result<T, Error>;
