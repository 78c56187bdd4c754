//! Error types for the transaction layer.

use thiserror::Error;

use crate::txn::TxnState;
use fsxact_backend::BackendError;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A different backend is already registered under this name.
    #[error("backend already registered: {0}")]
    AlreadyRegistered(String),

    /// No backend is registered under this name and none could be loaded.
    #[error("backend not found: {0}")]
    NotFound(String),

    /// A backend reported an empty format name.
    #[error("backend name must not be empty")]
    EmptyName,

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors that can occur when using the transaction layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A registry error occurred.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A backend error occurred. Backend errors propagate verbatim; this
    /// layer does not reinterpret them.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The transaction state machine was driven out of order. This is a
    /// caller bug (starting a started transaction, stopping one that was
    /// never started), not a recoverable runtime condition.
    #[error("invalid transaction state: expected {expected}, found {actual}")]
    InvalidState {
        /// The state the operation requires.
        expected: TxnState,
        /// The state the transaction was actually in.
        actual: TxnState,
    },
}
