//! Backend error types.

use thiserror::Error;

/// Errors that can occur in backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend ran out of journal resources (space, credits, or
    /// concurrent-transaction slots).
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// No device with the given name is known to the backend.
    #[error("no such device: {0}")]
    NoSuchDevice(String),

    /// The transaction token does not refer to an in-flight transaction.
    #[error("unknown transaction: {0}")]
    UnknownTransaction(u64),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}
