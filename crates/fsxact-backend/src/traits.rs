//! The backend capability trait.
//!
//! This module defines the contract between the transaction layer and a
//! pluggable journaling backend:
//!
//! - [`Backend`] - The capability set: create, start and stop transactions
//! - [`TxnToken`] - An opaque handle to one in-flight backend transaction
//!
//! The trait is object-safe so that backends can be registered and
//! dispatched through `Arc<dyn Backend>` after being resolved by name.

use crate::env::Env;
use crate::error::BackendError;

/// An opaque handle to one in-flight backend transaction.
///
/// Tokens are minted by [`Backend::create`] and map to backend-internal
/// state; callers never interpret the value, they only carry it between
/// the create, start and stop operations of the backend that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxnToken(u64);

impl TxnToken {
    /// Create a token from a raw backend-assigned id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id backing this token.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// A pluggable implementation of atomic transaction semantics for one
/// storage/journal format.
///
/// One `Backend` serves every device of its format; operations take the
/// device name alongside the token. Implementations must be thread-safe
/// (`Send + Sync`): independent callers create, start and stop their own
/// transactions concurrently.
///
/// # Lifecycle
///
/// For each transaction the layer above calls, in order:
///
/// 1. [`create`](Self::create) - allocate journal state, mint a token
/// 2. [`start`](Self::start) - acquire journal resources (handle, credits)
/// 3. [`stop`](Self::stop) - commit or abort based on the caller's result
///
/// `stop` reporting `Ok(true)` means the mutations were durably committed;
/// `Ok(false)` means the transaction was cleanly aborted. The distinction
/// matters to the caller: commit notifications fire only on `Ok(true)`.
pub trait Backend: Send + Sync {
    /// The format name this backend implements (e.g. `"ext4fs"`).
    ///
    /// Must be non-empty and stable for the lifetime of the backend; the
    /// registry keys on it.
    fn name(&self) -> &str;

    /// Create a new transaction against `device`, returning its token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::ResourceExhausted`] if the journal cannot
    /// accept another transaction.
    fn create(&self, env: &Env, device: &str) -> Result<TxnToken, BackendError>;

    /// Start a created transaction, acquiring backend journal resources.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownTransaction`] if the token does not
    /// refer to a transaction created by this backend, or
    /// [`BackendError::ResourceExhausted`] if journal resources cannot be
    /// acquired.
    fn start(&self, env: &Env, device: &str, token: &TxnToken) -> Result<(), BackendError>;

    /// Stop a started transaction, committing if `result` is zero and
    /// aborting otherwise.
    ///
    /// Returns `true` iff the transaction's mutations were durably
    /// committed. The token is consumed; it must not be reused.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownTransaction`] if the token does not
    /// refer to an in-flight transaction.
    fn stop(
        &self,
        env: &Env,
        device: &str,
        token: TxnToken,
        result: i32,
    ) -> Result<bool, BackendError>;
}
