//! Router metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters shared by every router handle
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Records that passed the severity filter
    submitted: AtomicU64,
    /// Records dropped by the severity filter
    filtered: AtomicU64,
    /// Successful target invocations
    delivered: AtomicU64,
    /// Target invocations that failed
    failures: AtomicU64,
    /// Targets removed after a failure
    evicted: AtomicU64,
    /// Dispatch entries processed by `drain`
    drained: AtomicU64,
    /// Dispatch entries waiting for `drain`
    pending: AtomicUsize,
}

impl RouterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    pub fn inc_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    pub fn inc_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn drained(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }

    pub fn add_drained(&self, n: usize) {
        self.drained.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn set_pending(&self, len: usize) {
        self.pending.store(len, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            submitted: self.submitted(),
            filtered: self.filtered(),
            delivered: self.delivered(),
            failures: self.failures(),
            evicted: self.evicted(),
            drained: self.drained(),
            pending: self.pending(),
        }
    }
}

/// Snapshot of router metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterMetricsSnapshot {
    pub submitted: u64,
    pub filtered: u64,
    pub delivered: u64,
    pub failures: u64,
    pub evicted: u64,
    pub drained: u64,
    pub pending: usize,
}
