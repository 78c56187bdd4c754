//! Reference-counted backend handles.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::BackendEntry;
use fsxact_backend::Backend;

/// A counted reference to a registered backend.
///
/// Acquiring a handle increments the backend's use-count; dropping it
/// decrements the count. The handle holds a strong reference, so the
/// backend implementation stays alive while held even if it is
/// unregistered concurrently.
///
/// Handles are not `Clone`: one [`acquire`](super::BackendRegistry::acquire)
/// produces exactly one count.
pub struct BackendHandle {
    entry: Arc<BackendEntry>,
}

impl BackendHandle {
    pub(crate) fn new(entry: Arc<BackendEntry>) -> Self {
        entry.users.fetch_add(1, Ordering::SeqCst);
        Self { entry }
    }

    /// The backend this handle keeps alive.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.entry.backend
    }

    /// The backend's format name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.entry.backend.name()
    }

    /// Outstanding-handle count for this backend, including this handle.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.entry.users.load(Ordering::SeqCst)
    }
}

impl Drop for BackendHandle {
    fn drop(&mut self) {
        self.entry.users.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("backend", &self.name())
            .field("use_count", &self.use_count())
            .finish()
    }
}
