//! The backend registry.
//!
//! A [`BackendRegistry`] maps a format name to the backend implementation
//! that handles it. It is an explicit object rather than process-global
//! state: callers construct one (usually inside an `Arc`), inject it where
//! it is needed, and tests run isolated instances.
//!
//! Registration churn is rare; [`acquire`](BackendRegistry::acquire) and
//! handle drops are the hot path. One mutex guards the name map and is held
//! only for map updates; the dynamic-load step of `acquire` runs strictly
//! outside the lock.

mod handle;
mod loader;

pub use handle::BackendHandle;
pub use loader::{module_name, BackendLoader, FnLoader, MODULE_PREFIX};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::RegistryError;
use fsxact_backend::Backend;

/// A registered backend plus its outstanding-handle count.
pub(crate) struct BackendEntry {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) users: AtomicUsize,
}

/// A directory of loaded backend implementations, keyed by format name.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use fsxact::registry::BackendRegistry;
/// use fsxact_backend::backends::MemJournalBackend;
///
/// let registry = BackendRegistry::new();
/// registry.register(Arc::new(MemJournalBackend::new("ext4fs")))?;
///
/// let handle = registry.acquire("ext4fs")?;
/// assert_eq!(registry.use_count("ext4fs"), 1);
/// drop(handle);
/// assert_eq!(registry.use_count("ext4fs"), 0);
/// ```
pub struct BackendRegistry {
    /// Format name -> entry. Guarded mutations only.
    entries: Mutex<HashMap<String, Arc<BackendEntry>>>,

    /// Loader invoked when `acquire` misses, outside the lock.
    loader: Option<Arc<dyn BackendLoader>>,

    /// Count of registered backend modules currently in use.
    module_refs: AtomicUsize,
}

impl BackendRegistry {
    /// Create an empty registry with no loader.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), loader: None, module_refs: AtomicUsize::new(0) }
    }

    /// Create an empty registry that resolves missing backends through
    /// `loader`.
    #[must_use]
    pub fn with_loader(loader: Arc<dyn BackendLoader>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            loader: Some(loader),
            module_refs: AtomicUsize::new(0),
        }
    }

    /// Register a backend under its format name.
    ///
    /// Re-registering the exact same backend (pointer-identical `Arc`) is
    /// an idempotent no-op. At most one backend per name is live at a time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if a *different*
    /// backend already claims the name, or [`RegistryError::EmptyName`] if
    /// the backend reports an empty name.
    pub fn register(&self, backend: Arc<dyn Backend>) -> Result<(), RegistryError> {
        let name = backend.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut entries = self.lock_entries()?;
        if let Some(existing) = entries.get(&name) {
            if Arc::ptr_eq(&existing.backend, &backend) {
                return Ok(());
            }
            return Err(RegistryError::AlreadyRegistered(name));
        }

        entries.insert(name.clone(), Arc::new(BackendEntry { backend, users: AtomicUsize::new(0) }));
        self.module_refs.fetch_add(1, Ordering::SeqCst);
        debug!(backend = %name, "backend registered");
        Ok(())
    }

    /// Remove a backend by name.
    ///
    /// Returns `true` if an entry was removed, `false` if the name was not
    /// registered (a no-op). The outstanding use-count is deliberately not
    /// checked: handles hold their own strong reference, so an unregistered
    /// backend stays alive until the last handle drops, but new `acquire`
    /// calls will no longer find it.
    pub fn unregister(&self, name: &str) -> bool {
        let removed =
            self.entries.lock().map(|mut entries| entries.remove(name).is_some()).unwrap_or(false);
        if removed {
            self.module_refs.fetch_sub(1, Ordering::SeqCst);
            debug!(backend = %name, "backend unregistered");
        }
        removed
    }

    /// Look up a backend by name without taking a use-count.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Backend>, RegistryError> {
        self.entry(name)?
            .map(|entry| Arc::clone(&entry.backend))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Acquire a handle to a backend, loading it on demand.
    ///
    /// If the name is not registered and a loader was injected, the loader
    /// is invoked (outside the registry lock) with the derived module name
    /// `backend_<name>` and is expected to make the backend self-register;
    /// the lookup is then retried once.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the backend is not registered
    /// and cannot be loaded.
    pub fn acquire(&self, name: &str) -> Result<BackendHandle, RegistryError> {
        if let Some(entry) = self.entry(name)? {
            return Ok(BackendHandle::new(entry));
        }

        let Some(loader) = &self.loader else {
            return Err(RegistryError::NotFound(name.to_string()));
        };

        // Loader may block on I/O; never call it under the lock.
        let module = module_name(name);
        debug!(backend = %name, module = %module, "loading backend module");
        if !loader.load(self, &module) {
            warn!(backend = %name, module = %module, "backend module load failed");
            return Err(RegistryError::NotFound(name.to_string()));
        }

        match self.entry(name)? {
            Some(entry) => Ok(BackendHandle::new(entry)),
            None => {
                warn!(backend = %name, module = %module, "loaded module did not register backend");
                Err(RegistryError::NotFound(name.to_string()))
            }
        }
    }

    /// Release a handle, decrementing the backend's use-count.
    ///
    /// Equivalent to dropping the handle; provided for callers that want
    /// the release to be explicit.
    pub fn release(handle: BackendHandle) {
        drop(handle);
    }

    /// Outstanding-handle count for a backend, `0` if not registered.
    #[must_use]
    pub fn use_count(&self, name: &str) -> usize {
        self.entries
            .lock()
            .map(|entries| {
                entries.get(name).map_or(0, |entry| entry.users.load(Ordering::SeqCst))
            })
            .unwrap_or(0)
    }

    /// Count of registered backend modules currently in use.
    #[must_use]
    pub fn module_refs(&self) -> usize {
        self.module_refs.load(Ordering::SeqCst)
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the registry has no backends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, name: &str) -> Result<Option<Arc<BackendEntry>>, RegistryError> {
        Ok(self.lock_entries()?.get(name).cloned())
    }

    fn lock_entries(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Arc<BackendEntry>>>, RegistryError> {
        self.entries.lock().map_err(|_| RegistryError::Internal("registry lock poisoned".into()))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
