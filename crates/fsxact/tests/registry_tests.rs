//! Integration tests for the backend registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use fsxact::registry::{module_name, BackendRegistry, FnLoader};
use fsxact::{Backend, BackendError, Env, RegistryError, TxnToken};

/// A minimal backend: create mints sequential tokens, start succeeds,
/// stop commits iff the result is zero.
struct StubBackend {
    name: String,
    next_token: AtomicU64,
}

impl StubBackend {
    fn new(name: &str) -> Self {
        Self { name: name.to_string(), next_token: AtomicU64::new(1) }
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, _env: &Env, _device: &str) -> Result<TxnToken, BackendError> {
        Ok(TxnToken::new(self.next_token.fetch_add(1, Ordering::SeqCst)))
    }

    fn start(&self, _env: &Env, _device: &str, _token: &TxnToken) -> Result<(), BackendError> {
        Ok(())
    }

    fn stop(
        &self,
        _env: &Env,
        _device: &str,
        _token: TxnToken,
        result: i32,
    ) -> Result<bool, BackendError> {
        Ok(result == 0)
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_and_lookup() {
    let registry = BackendRegistry::new();
    let backend: Arc<dyn Backend> = Arc::new(StubBackend::new("ext4fs"));

    registry.register(Arc::clone(&backend)).expect("failed to register");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.module_refs(), 1);

    let found = registry.lookup("ext4fs").expect("backend not found");
    assert!(Arc::ptr_eq(&found, &backend));
}

#[test]
fn test_register_same_backend_twice_is_idempotent() {
    let registry = BackendRegistry::new();
    let backend: Arc<dyn Backend> = Arc::new(StubBackend::new("ext4fs"));

    registry.register(Arc::clone(&backend)).expect("first register failed");
    registry.register(Arc::clone(&backend)).expect("re-register should be a no-op");

    assert_eq!(registry.len(), 1);
    // Idempotent re-registration does not count as a second module use.
    assert_eq!(registry.module_refs(), 1);
}

#[test]
fn test_register_distinct_backend_under_same_name_fails() {
    let registry = BackendRegistry::new();
    let first: Arc<dyn Backend> = Arc::new(StubBackend::new("ext4fs"));
    let second: Arc<dyn Backend> = Arc::new(StubBackend::new("ext4fs"));

    registry.register(Arc::clone(&first)).expect("first register failed");
    let err = registry.register(second).expect_err("duplicate name should fail");
    assert!(matches!(err, RegistryError::AlreadyRegistered(name) if name == "ext4fs"));

    // The first registration is retained.
    let found = registry.lookup("ext4fs").expect("backend not found");
    assert!(Arc::ptr_eq(&found, &first));
}

#[test]
fn test_register_empty_name_fails() {
    let registry = BackendRegistry::new();
    let err = registry
        .register(Arc::new(StubBackend::new("")))
        .expect_err("empty name should fail");
    assert!(matches!(err, RegistryError::EmptyName));
}

#[test]
fn test_unregister() {
    let registry = BackendRegistry::new();
    registry.register(Arc::new(StubBackend::new("ext4fs"))).expect("failed to register");

    assert!(registry.unregister("ext4fs"));
    assert_eq!(registry.len(), 0);
    assert_eq!(registry.module_refs(), 0);
    assert!(matches!(registry.lookup("ext4fs"), Err(RegistryError::NotFound(_))));

    // Unregistering an unknown name is a no-op.
    assert!(!registry.unregister("ext4fs"));
    assert_eq!(registry.module_refs(), 0);
}

// ============================================================================
// Acquire / release
// ============================================================================

#[test]
fn test_acquire_and_release() {
    let registry = BackendRegistry::new();
    registry.register(Arc::new(StubBackend::new("ext4fs"))).expect("failed to register");

    let handle = registry.acquire("ext4fs").expect("failed to acquire");
    assert_eq!(handle.name(), "ext4fs");
    assert_eq!(registry.use_count("ext4fs"), 1);

    let second = registry.acquire("ext4fs").expect("failed to acquire again");
    assert_eq!(registry.use_count("ext4fs"), 2);

    drop(handle);
    assert_eq!(registry.use_count("ext4fs"), 1);

    BackendRegistry::release(second);
    assert_eq!(registry.use_count("ext4fs"), 0);
}

#[test]
fn test_acquire_unknown_without_loader() {
    let registry = BackendRegistry::new();

    let err = registry.acquire("zfs").expect_err("unknown backend should fail");
    assert!(matches!(err, RegistryError::NotFound(name) if name == "zfs"));
    assert!(registry.is_empty());
}

#[test]
fn test_acquire_loads_through_loader() {
    let loader = FnLoader::new(|registry: &BackendRegistry, module: &str| {
        assert_eq!(module, module_name("ext4fs"));
        registry.register(Arc::new(StubBackend::new("ext4fs"))).is_ok()
    });
    let registry = BackendRegistry::with_loader(Arc::new(loader));

    let handle = registry.acquire("ext4fs").expect("loader should satisfy acquire");
    assert_eq!(handle.name(), "ext4fs");
    assert_eq!(registry.use_count("ext4fs"), 1);
}

#[test]
fn test_acquire_with_failing_loader() {
    let registry = BackendRegistry::with_loader(Arc::new(FnLoader::new(
        |_: &BackendRegistry, _: &str| false,
    )));

    let err = registry.acquire("zfs").expect_err("failed load should surface NotFound");
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert!(registry.is_empty());
}

#[test]
fn test_acquire_when_loaded_module_registers_wrong_name() {
    let loader = FnLoader::new(|registry: &BackendRegistry, _module: &str| {
        // Module loads fine but self-registers under a different name.
        registry.register(Arc::new(StubBackend::new("reiserfs"))).is_ok()
    });
    let registry = BackendRegistry::with_loader(Arc::new(loader));

    let err = registry.acquire("ext4fs").expect_err("wrong self-registration should fail");
    assert!(matches!(err, RegistryError::NotFound(name) if name == "ext4fs"));
    // The stray registration is visible under its own name.
    assert!(registry.lookup("reiserfs").is_ok());
}

#[test]
fn test_unregister_with_outstanding_handle_keeps_backend_alive() {
    // The original contract: unregister succeeds regardless of use-count.
    // The handle holds a strong reference, so the backend stays usable.
    let registry = BackendRegistry::new();
    registry.register(Arc::new(StubBackend::new("ext4fs"))).expect("failed to register");

    let handle = registry.acquire("ext4fs").expect("failed to acquire");
    assert!(registry.unregister("ext4fs"));

    // New acquires miss, but the held handle still works.
    assert!(matches!(registry.acquire("ext4fs"), Err(RegistryError::NotFound(_))));
    let env = Env::new();
    let token = handle.backend().create(&env, "mds0").expect("held backend should still work");
    handle.backend().start(&env, "mds0", &token).expect("start failed");

    // The name is free for a fresh registration.
    registry.register(Arc::new(StubBackend::new("ext4fs"))).expect("re-register failed");
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_acquire_release_balances_use_count() {
    const THREADS: usize = 8;
    const PAIRS: usize = 200;

    let registry = Arc::new(BackendRegistry::new());
    registry.register(Arc::new(StubBackend::new("ext4fs"))).expect("failed to register");

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..PAIRS {
                    let handle = registry.acquire("ext4fs").expect("acquire failed");
                    drop(handle);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(registry.use_count("ext4fs"), 0);
}
