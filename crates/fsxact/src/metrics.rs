//! Transaction counters.
//!
//! Thread-safe, low-overhead counters kept as atomics and exposed as plain
//! integers through [`TxnMetricsSnapshot`]. A reporting subsystem formats
//! them; this layer only counts. Counts are also emitted through the
//! [`metrics`] crate so an installed recorder (e.g. a Prometheus exporter)
//! picks them up.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-device transaction counters.
#[derive(Debug)]
pub struct TxnMetrics {
    /// Transactions that reached the started state.
    started: AtomicU64,
    /// Transactions the backend reported as durably committed.
    committed: AtomicU64,
    /// Transactions stopped without a durable commit.
    aborted: AtomicU64,
    /// Hook invocations that returned a failure status.
    hook_failures: AtomicU64,
}

impl TxnMetrics {
    /// Create a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            hook_failures: AtomicU64::new(0),
        }
    }

    /// Record a transaction start.
    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("fsxact_txns_started_total").increment(1);
    }

    /// Record a transaction stop with its commit outcome.
    pub fn record_stop(&self, committed: bool) {
        if committed {
            self.committed.fetch_add(1, Ordering::Relaxed);
            ::metrics::counter!("fsxact_txns_committed_total").increment(1);
        } else {
            self.aborted.fetch_add(1, Ordering::Relaxed);
            ::metrics::counter!("fsxact_txns_aborted_total").increment(1);
        }
    }

    /// Record a hook that returned a failure status.
    pub fn record_hook_failure(&self) {
        self.hook_failures.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("fsxact_hook_failures_total").increment(1);
    }

    /// Get a point-in-time snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> TxnMetricsSnapshot {
        TxnMetricsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            hook_failures: self.hook_failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.started.store(0, Ordering::Relaxed);
        self.committed.store(0, Ordering::Relaxed);
        self.aborted.store(0, Ordering::Relaxed);
        self.hook_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for TxnMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of [`TxnMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxnMetricsSnapshot {
    /// Transactions that reached the started state.
    pub started: u64,
    /// Transactions durably committed.
    pub committed: u64,
    /// Transactions stopped without commit.
    pub aborted: u64,
    /// Hook invocations that returned a failure status.
    pub hook_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = TxnMetrics::new();
        metrics.record_started();
        metrics.record_started();
        metrics.record_stop(true);
        metrics.record_stop(false);
        metrics.record_hook_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.started, 2);
        assert_eq!(snapshot.committed, 1);
        assert_eq!(snapshot.aborted, 1);
        assert_eq!(snapshot.hook_failures, 1);
    }

    #[test]
    fn test_reset() {
        let metrics = TxnMetrics::new();
        metrics.record_started();
        metrics.record_stop(true);
        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.started, 0);
        assert_eq!(snapshot.committed, 0);
    }
}
