//! Error taxonomy shared by every store backend and the HTTP layer.
//!
//! Errors are transport agnostic. The server maps each variant to a
//! status code via [`ContactError::code`] and its own status table.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ContactError>;

/// Failure of a contact operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// Missing required field, malformed email, or over-long value.
    #[error("{0}")]
    Validation(String),

    /// The email is already used by another contact.
    #[error("Email already exists")]
    DuplicateEmail(String),

    /// No contact has the given id.
    #[error("Contact not found")]
    NotFound(i64),

    /// Any other persistence failure. The operation left no partial writes.
    #[error("{0}")]
    Store(String),
}

impl ContactError {
    /// Machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ContactError::Validation(_) => "validation_error",
            ContactError::DuplicateEmail(_) => "duplicate_email",
            ContactError::NotFound(_) => "not_found",
            ContactError::Store(_) => "store_error",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ContactError::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        ContactError::Store(message.into())
    }
}
