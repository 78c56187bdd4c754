//! The per-operation transaction wrapper.
//!
//! A [`Txn`] represents one atomic metadata update against a backend
//! device, from creation through commit or abort. It advances through a
//! strict state machine:
//!
//! ```text
//! Created --start()--> Started --stop(result)--> Stopped
//! ```
//!
//! No transition skips a state. Driving the machine out of order is a
//! caller bug and is rejected with [`Error::InvalidState`].
//!
//! The caller's `result` code passed to [`stop`](Txn::stop) - not any hook
//! return value - determines whether the backend commits or aborts.

mod hooks;

pub use hooks::{HookFn, HookStatus, StopReport, TxnHooks};

use std::sync::Arc;

use tracing::debug;

use crate::device::DeviceCore;
use crate::error::Error;
use fsxact_backend::{Env, TxnToken};

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Created but not yet started.
    Created,
    /// Started; backend journal resources are held.
    Started,
    /// Stopped; terminal.
    Stopped,
}

impl std::fmt::Display for TxnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Started => f.write_str("started"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// One in-flight atomic metadata update.
///
/// Minted by [`Device::begin`](crate::device::Device::begin) and owned by a
/// single logical caller for the duration of one operation; never shared
/// across threads. Once stopped the wrapper stays readable (id, state,
/// recorded result) but accepts no further operations.
///
/// # Example
///
/// ```ignore
/// let mut txn = device.begin(&env)?;
/// txn.start(&env)?;
/// // ... metadata mutations against the backend ...
/// let report = txn.stop(&env, 0)?;
/// assert!(report.committed);
/// ```
pub struct Txn {
    /// The device binding this transaction runs against.
    core: Arc<DeviceCore>,

    /// Unique id within the device, for logging.
    id: u64,

    /// The backend's token for this transaction.
    token: TxnToken,

    /// Lifecycle state.
    state: TxnState,

    /// Result code recorded at stop time.
    result: i32,
}

impl Txn {
    pub(crate) fn new(core: Arc<DeviceCore>, id: u64, token: TxnToken) -> Self {
        Self { core, id, token, state: TxnState::Created, result: 0 }
    }

    /// The transaction id, unique within its device.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The backend token, for passing to backend-specific mutation APIs
    /// between `start` and `stop`.
    #[must_use]
    pub const fn token(&self) -> TxnToken {
        self.token
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TxnState {
        self.state
    }

    /// The result code recorded at stop time (`0` until stopped).
    #[must_use]
    pub const fn result(&self) -> i32 {
        self.result
    }

    /// The device name this transaction runs against.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.core.name
    }

    /// Start the transaction, acquiring backend journal resources.
    ///
    /// On success the start hook (if installed) fires and its status is
    /// returned. The status is advisory: a failing start hook is reported
    /// but does not roll back the already-started backend transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the transaction is not in the
    /// `Created` state; backend start errors propagate verbatim.
    pub fn start(&mut self, env: &Env) -> Result<Option<HookStatus>, Error> {
        if self.state != TxnState::Created {
            return Err(Error::InvalidState { expected: TxnState::Created, actual: self.state });
        }

        let core = Arc::clone(&self.core);
        core.backend().start(env, &core.name, &self.token)?;
        self.state = TxnState::Started;
        core.metrics.record_started();

        let status = core.hooks.start.as_ref().map(|hook| hook(env, &*self, core.cookie));
        if status.is_some_and(HookStatus::is_failure) {
            core.metrics.record_hook_failure();
        }
        Ok(status)
    }

    /// Stop the transaction, committing or aborting based on `result`.
    ///
    /// `result` is recorded into the wrapper: zero asks the backend to
    /// commit, any other value to abort. After the backend stop completes,
    /// the stop hook fires unconditionally; the commit hook fires only if
    /// the backend reported a durable commit. Hook statuses are carried in
    /// the [`StopReport`], never as errors - durability semantics always
    /// win over observer failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the transaction is not in the
    /// `Started` state. Backend stop errors propagate verbatim; in that
    /// case no hook fires and the wrapper is left `Stopped` with `result`
    /// recorded.
    pub fn stop(&mut self, env: &Env, result: i32) -> Result<StopReport, Error> {
        if self.state != TxnState::Started {
            return Err(Error::InvalidState { expected: TxnState::Started, actual: self.state });
        }

        self.result = result;
        self.state = TxnState::Stopped;

        let core = Arc::clone(&self.core);
        let committed = core.backend().stop(env, &core.name, self.token, result)?;

        let stop_hook = core.hooks.stop.as_ref().map(|hook| hook(env, &*self, core.cookie));
        let commit_hook = if committed {
            core.hooks.commit.as_ref().map(|hook| hook(env, &*self, core.cookie))
        } else {
            None
        };

        core.metrics.record_stop(committed);
        if stop_hook.is_some_and(HookStatus::is_failure) {
            core.metrics.record_hook_failure();
        }
        if commit_hook.is_some_and(HookStatus::is_failure) {
            core.metrics.record_hook_failure();
        }

        debug!(
            txn = self.id,
            device = %core.name,
            result,
            committed,
            "transaction stopped"
        );

        Ok(StopReport { result, committed, stop_hook, commit_hook })
    }
}

impl std::fmt::Debug for Txn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Txn")
            .field("id", &self.id)
            .field("device", &self.device())
            .field("state", &self.state)
            .field("result", &self.result)
            .finish()
    }
}
