//! Delivery metrics
//!
//! Atomic counters for the background delivery stage. Relaxed ordering,
//! eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics for the delivery worker
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    /// Worker runs that got past the preconditions
    runs: AtomicU64,

    /// Runs aborted because no admissible transport was up
    runs_offline: AtomicU64,

    /// Batches submitted successfully
    batches_sent: AtomicU64,

    /// Batches whose submission failed (retried next run)
    batches_failed: AtomicU64,

    /// Batches skipped (empty or unknown destination)
    batches_skipped: AtomicU64,

    /// Packets inside successfully submitted batches
    packets_sent: AtomicU64,

    /// Source files deleted after successful submission
    files_deleted: AtomicU64,
}

impl DeliveryMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            runs_offline: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            batches_skipped: AtomicU64::new(0),
            packets_sent: AtomicU64::new(0),
            files_deleted: AtomicU64::new(0),
        }
    }

    /// Record a run that passed the preconditions
    #[inline]
    pub fn record_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a run aborted for lack of an admissible transport
    #[inline]
    pub fn record_run_offline(&self) {
        self.runs_offline.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully submitted batch
    #[inline]
    pub fn record_sent(&self, packet_count: u64) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.packets_sent.fetch_add(packet_count, Ordering::Relaxed);
    }

    /// Record a failed submission
    #[inline]
    pub fn record_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a skipped batch
    #[inline]
    pub fn record_skipped(&self) {
        self.batches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a deleted source file
    #[inline]
    pub fn record_file_deleted(&self) {
        self.files_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            runs_offline: self.runs_offline.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            batches_skipped: self.batches_skipped.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            files_deleted: self.files_deleted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of delivery metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliverySnapshot {
    /// Runs past the preconditions
    pub runs: u64,
    /// Runs aborted offline
    pub runs_offline: u64,
    /// Batches submitted successfully
    pub batches_sent: u64,
    /// Batches whose submission failed
    pub batches_failed: u64,
    /// Batches skipped
    pub batches_skipped: u64,
    /// Packets inside successful batches
    pub packets_sent: u64,
    /// Source files deleted
    pub files_deleted: u64,
}

/// Handle for reading delivery metrics externally
#[derive(Debug, Clone)]
pub struct DeliveryMetricsHandle {
    metrics: Arc<DeliveryMetrics>,
}

impl DeliveryMetricsHandle {
    /// Wrap shared metrics in a handle
    pub(crate) fn new(metrics: Arc<DeliveryMetrics>) -> Self {
        Self { metrics }
    }

    /// Get a point-in-time snapshot
    #[inline]
    pub fn snapshot(&self) -> DeliverySnapshot {
        self.metrics.snapshot()
    }
}
