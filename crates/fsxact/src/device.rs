//! Device bindings.
//!
//! A [`Device`] couples an acquired [`BackendHandle`] with a device name,
//! the lifecycle hook set and per-device transaction counters. Hooks are
//! installed once here, not per transaction; every transaction minted
//! through [`Device::begin`] flows through them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::metrics::{TxnMetrics, TxnMetricsSnapshot};
use crate::registry::BackendHandle;
use crate::txn::{Txn, TxnHooks};
use fsxact_backend::{Backend, Env};

/// Shared state behind a device binding and its transactions.
pub(crate) struct DeviceCore {
    /// Device name, passed to every backend operation.
    pub(crate) name: String,

    /// Keeps the backend alive and counted while the binding exists.
    pub(crate) handle: BackendHandle,

    /// Lifecycle hooks, fixed at bind time.
    pub(crate) hooks: TxnHooks,

    /// Opaque cookie handed to every hook invocation.
    pub(crate) cookie: u64,

    /// Per-device transaction counters.
    pub(crate) metrics: TxnMetrics,

    /// Mint for transaction ids.
    next_txn_id: AtomicU64,
}

impl DeviceCore {
    pub(crate) fn backend(&self) -> &Arc<dyn Backend> {
        self.handle.backend()
    }
}

/// Configuration for binding a device to a backend.
#[derive(Debug)]
pub struct DeviceConfig {
    name: String,
    hooks: TxnHooks,
    cookie: u64,
}

impl DeviceConfig {
    /// Create a configuration for the named device.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), hooks: TxnHooks::new(), cookie: 0 }
    }

    /// Install the lifecycle hook set.
    #[must_use]
    pub fn hooks(mut self, hooks: TxnHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set the opaque cookie passed to every hook invocation.
    #[must_use]
    pub const fn cookie(mut self, cookie: u64) -> Self {
        self.cookie = cookie;
        self
    }

    /// Bind the device to an acquired backend handle.
    #[must_use]
    pub fn bind(self, handle: BackendHandle) -> Device {
        Device {
            core: Arc::new(DeviceCore {
                name: self.name,
                handle,
                hooks: self.hooks,
                cookie: self.cookie,
                metrics: TxnMetrics::new(),
                next_txn_id: AtomicU64::new(1),
            }),
        }
    }
}

/// A device bound to a backend, the factory for transactions.
///
/// # Example
///
/// ```ignore
/// use fsxact::device::DeviceConfig;
/// use fsxact::txn::{HookStatus, TxnHooks};
///
/// let handle = registry.acquire("ext4fs")?;
/// let hooks = TxnHooks::new().on_commit(|_env, txn, _cookie| {
///     println!("txn {} committed", txn.id());
///     HookStatus::OK
/// });
/// let device = DeviceConfig::new("mds0").hooks(hooks).bind(handle);
///
/// let mut txn = device.begin(&env)?;
/// txn.start(&env)?;
/// txn.stop(&env, 0)?;
/// ```
pub struct Device {
    core: Arc<DeviceCore>,
}

impl Device {
    /// Bind a device with no hooks and a zero cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, handle: BackendHandle) -> Self {
        DeviceConfig::new(name).bind(handle)
    }

    /// The device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// The format name of the bound backend.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.core.handle.name()
    }

    /// Create a new transaction against this device.
    ///
    /// The transaction starts in the `Created` state; call
    /// [`Txn::start`] before performing mutations.
    ///
    /// # Errors
    ///
    /// Backend creation errors (e.g. journal exhaustion) propagate
    /// verbatim.
    pub fn begin(&self, env: &Env) -> Result<Txn, Error> {
        let token = self.core.backend().create(env, &self.core.name)?;
        let id = self.core.next_txn_id.fetch_add(1, Ordering::Relaxed);
        Ok(Txn::new(Arc::clone(&self.core), id, token))
    }

    /// A point-in-time snapshot of this device's transaction counters.
    #[must_use]
    pub fn metrics(&self) -> TxnMetricsSnapshot {
        self.core.metrics.snapshot()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name())
            .field("backend", &self.backend_name())
            .finish()
    }
}
