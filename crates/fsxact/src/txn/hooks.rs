//! Transaction lifecycle hooks.
//!
//! Hooks are observers, not gatekeepers: a hook returns a [`HookStatus`],
//! not a `Result`, so the type system guarantees that instrumentation and
//! notification logic can never alter whether a transaction commits or
//! aborts. Non-zero statuses are surfaced to the caller as secondary
//! information alongside the primary transaction result.

use super::Txn;
use fsxact_backend::Env;

/// Advisory status returned by a hook.
///
/// Zero means success. A non-zero status is reported to the transaction
/// caller but never unwinds backend operations that already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookStatus(i32);

impl HookStatus {
    /// The success status.
    pub const OK: Self = Self(0);

    /// Create a status from a raw code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether this status reports a failure.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.0 != 0
    }
}

impl Default for HookStatus {
    fn default() -> Self {
        Self::OK
    }
}

/// Signature shared by all three hook slots.
///
/// Hooks receive the execution context, the transaction being observed
/// (after the relevant state transition has been recorded) and the opaque
/// cookie installed with the hook set.
pub type HookFn = dyn Fn(&Env, &Txn, u64) -> HookStatus + Send + Sync;

/// The three optional lifecycle hook slots.
///
/// Installed once per device binding, not per transaction; every
/// transaction minted through that binding fires them. Relative to backend
/// operations the order is fixed:
///
/// - `start` fires strictly after the backend start succeeds
/// - `stop` fires strictly after the backend stop completes, commit or abort
/// - `commit` fires strictly after the stop hook, and only on durable commit
#[derive(Default)]
pub struct TxnHooks {
    pub(crate) start: Option<Box<HookFn>>,
    pub(crate) stop: Option<Box<HookFn>>,
    pub(crate) commit: Option<Box<HookFn>>,
}

impl TxnHooks {
    /// Create an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the start hook.
    #[must_use]
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&Env, &Txn, u64) -> HookStatus + Send + Sync + 'static,
    {
        self.start = Some(Box::new(f));
        self
    }

    /// Install the stop hook.
    #[must_use]
    pub fn on_stop<F>(mut self, f: F) -> Self
    where
        F: Fn(&Env, &Txn, u64) -> HookStatus + Send + Sync + 'static,
    {
        self.stop = Some(Box::new(f));
        self
    }

    /// Install the commit hook.
    #[must_use]
    pub fn on_commit<F>(mut self, f: F) -> Self
    where
        F: Fn(&Env, &Txn, u64) -> HookStatus + Send + Sync + 'static,
    {
        self.commit = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for TxnHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxnHooks")
            .field("start", &self.start.is_some())
            .field("stop", &self.stop.is_some())
            .field("commit", &self.commit.is_some())
            .finish()
    }
}

/// Outcome of stopping a transaction.
///
/// `result` and `committed` are the primary outcome; the hook statuses are
/// secondary and never influence it.
#[derive(Debug, Clone, Copy)]
pub struct StopReport {
    /// The result code the caller passed to `stop`.
    pub result: i32,

    /// Whether the backend reported a durable commit.
    pub committed: bool,

    /// Status of the stop hook, if one is installed.
    pub stop_hook: Option<HookStatus>,

    /// Status of the commit hook, if one is installed and fired.
    pub commit_hook: Option<HookStatus>,
}

impl StopReport {
    /// Whether any fired hook reported a failure.
    #[must_use]
    pub fn hook_failed(&self) -> bool {
        self.stop_hook.is_some_and(HookStatus::is_failure)
            || self.commit_hook.is_some_and(HookStatus::is_failure)
    }
}
