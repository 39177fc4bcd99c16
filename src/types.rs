//! Shared error and result types

use hyper::StatusCode;
use thiserror::Error;

/// Crate-wide error taxonomy
///
/// Every fallible operation in rosterd returns one of these kinds. The HTTP
/// layer maps them to status codes via [`RosterError::status_code`]; the
/// clock-in consumer maps them to ack outcomes (see `worker::processor`).
#[derive(Debug, Error)]
pub enum RosterError {
    /// Caller-correctable input failure (empty ids, bad date ordering,
    /// unknown enum literal, malformed filter date literal)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A get/replace/delete targeted a key that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A create targeted a key that already exists
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transport or serialization failure inside the table store,
    /// including field-level decode failures on read
    #[error("store error: {0}")]
    Store(String),

    /// Malformed queue message payload
    #[error("decode error: {0}")]
    Decode(String),

    /// NATS transport failure
    #[error("nats error: {0}")]
    Nats(String),

    /// Underlying I/O failure (listener bind, accept)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RosterError {
    /// Store-level decode failure for a single named field
    pub fn bad_field(field: &str, reason: impl std::fmt::Display) -> Self {
        RosterError::Store(format!("field '{}': {}", field, reason))
    }

    /// HTTP status code for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            RosterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RosterError::NotFound(_) => StatusCode::NOT_FOUND,
            RosterError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            RosterError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RosterError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RosterError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RosterError::Store("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RosterError::Decode("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_field_names_the_field() {
        let err = RosterError::bad_field("status", "unknown literal 'Done'");
        assert!(err.to_string().contains("status"));
        assert!(err.to_string().contains("Done"));
    }
}
