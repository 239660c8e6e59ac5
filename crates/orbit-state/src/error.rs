//! Error types for the Orbit state store.

use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state store operations.
///
/// These kinds are the store's external contract: a gateway exposing the
/// store over the wire maps them to status codes (`NotFound` → not-found,
/// `AlreadyExists` → conflict, `Validation` and the transition errors →
/// bad-request, everything else → internal error).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("already terminating: {0}")]
    AlreadyTerminating(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),
}
