//! `fsxact` - Pluggable backend-transaction registry.
//!
//! `fsxact` is the in-memory core of how a filesystem layer makes on-disk
//! metadata updates atomic across pluggable backend storage formats: a
//! registry of journaling-backend implementations, reference-counted
//! handles to them, and a per-operation transaction wrapper with observer
//! hooks.
//!
//! # Concepts
//!
//! - **Registry**: maps a format name (e.g. `"ext4fs"`) to the one backend
//!   implementation handling that format. Backends can be loaded on demand
//!   through an injected [`registry::BackendLoader`].
//! - **Handle**: acquiring a backend yields a [`registry::BackendHandle`]
//!   that keeps the implementation alive and counted while in use.
//! - **Device**: a [`device::Device`] binds a handle to a named device and
//!   installs the hook set once; all transactions are minted through it.
//! - **Transaction**: a [`txn::Txn`] advances Created -> Started -> Stopped;
//!   the result code passed to `stop` decides commit versus abort. Hooks
//!   observe the lifecycle but can never alter the outcome.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use fsxact::device::DeviceConfig;
//! use fsxact::registry::BackendRegistry;
//! use fsxact_backend::backends::MemJournalBackend;
//! use fsxact_backend::Env;
//!
//! let registry = BackendRegistry::new();
//! registry.register(Arc::new(MemJournalBackend::new("ext4fs")))?;
//!
//! let device = DeviceConfig::new("mds0").bind(registry.acquire("ext4fs")?);
//!
//! let env = Env::new().with_op("mkdir");
//! let mut txn = device.begin(&env)?;
//! txn.start(&env)?;
//! // ... metadata mutations ...
//! let report = txn.stop(&env, 0)?;
//! assert!(report.committed);
//! ```

pub mod device;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod txn;

pub use device::{Device, DeviceConfig};
pub use error::{Error, RegistryError};
pub use registry::{BackendHandle, BackendLoader, BackendRegistry};
pub use txn::{HookStatus, StopReport, Txn, TxnHooks, TxnState};

// Re-export the backend contract so callers need only one crate.
pub use fsxact_backend::{Backend, BackendError, Env, TxnToken};
