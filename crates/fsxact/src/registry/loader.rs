//! Dynamic backend loading.
//!
//! The registry itself has no dependency on any particular loading
//! mechanism; it is handed a [`BackendLoader`] and invokes it with a
//! derived module name when an [`acquire`](super::BackendRegistry::acquire)
//! misses. A production loader might ask the platform to load a module; a
//! test loader registers a stub directly.

use super::BackendRegistry;

/// Prefix for derived backend module names.
pub const MODULE_PREFIX: &str = "backend_";

/// Derive the module name for a backend format name.
#[must_use]
pub fn module_name(backend: &str) -> String {
    format!("{MODULE_PREFIX}{backend}")
}

/// A collaborator that can make a backend module self-register.
///
/// `load` may block (e.g. on I/O); the registry never calls it while
/// holding its lock. On success the loaded module is expected to have
/// called [`BackendRegistry::register`] with a backend whose name matches
/// the requested format; the registry verifies this with a retried lookup.
pub trait BackendLoader: Send + Sync {
    /// Attempt to load `module` and have it register into `registry`.
    ///
    /// Returns `true` if the module loaded, `false` otherwise. Whether the
    /// module actually registered the expected backend is checked by the
    /// caller.
    fn load(&self, registry: &BackendRegistry, module: &str) -> bool;
}

/// A [`BackendLoader`] backed by a closure, mainly for tests.
pub struct FnLoader<F>(F);

impl<F> FnLoader<F>
where
    F: Fn(&BackendRegistry, &str) -> bool + Send + Sync,
{
    /// Wrap a closure as a loader.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> BackendLoader for FnLoader<F>
where
    F: Fn(&BackendRegistry, &str) -> bool + Send + Sync,
{
    fn load(&self, registry: &BackendRegistry, module: &str) -> bool {
        (self.0)(registry, module)
    }
}
