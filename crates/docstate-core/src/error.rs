//! Error types for the boundary of the collection.
//!
//! The mutation engine never fails; these errors come from parsing ids,
//! building dynamic documents and loading snapshots.

use thiserror::Error;

/// Errors that can occur outside the mutation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocStateError {
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(String),

    #[error("Document has no `_id` field")]
    MissingId,

    #[error("Document `_id` must be a string, found {0}")]
    InvalidIdField(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<serde_json::Error> for DocStateError {
    fn from(err: serde_json::Error) -> Self {
        DocStateError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocStateError>;
