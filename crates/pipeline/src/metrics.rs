//! Pipeline metrics
//!
//! Atomic counters tracking the collection side of the pipeline.
//! All operations use relaxed ordering; values are eventually consistent,
//! not real-time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics for event admission, dispatch and packet accumulation
///
/// # Thread Safety
///
/// All methods are safe to call from multiple threads concurrently.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Events admitted by the collector
    events_accepted: AtomicU64,

    /// Events rejected at admission
    events_rejected: AtomicU64,

    /// Events fanned out to processors
    events_dispatched: AtomicU64,

    /// Dispatches skipped because the payload holder was gone
    payloads_expired: AtomicU64,

    /// Processor failures (isolated, non-fatal)
    processor_errors: AtomicU64,

    /// Packets handed to the collector buffer
    packets_collected: AtomicU64,

    /// Buffer flushes that reached the store
    flushes: AtomicU64,

    /// Flushes whose save reported lost groups
    flush_failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            events_accepted: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            events_dispatched: AtomicU64::new(0),
            payloads_expired: AtomicU64::new(0),
            processor_errors: AtomicU64::new(0),
            packets_collected: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
        }
    }

    /// Record an admitted event
    #[inline]
    pub fn record_accepted(&self) {
        self.events_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected event
    #[inline]
    pub fn record_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed dispatch fan-out
    #[inline]
    pub fn record_dispatched(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dispatch skipped for a vanished payload
    #[inline]
    pub fn record_payload_expired(&self) {
        self.payloads_expired.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an isolated processor failure
    #[inline]
    pub fn record_processor_error(&self) {
        self.processor_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a packet entering the buffer
    #[inline]
    pub fn record_packet_collected(&self) {
        self.packets_collected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a non-empty buffer flush
    #[inline]
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flush whose save lost packet groups
    #[inline]
    pub fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    #[inline]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            payloads_expired: self.payloads_expired.load(Ordering::Relaxed),
            processor_errors: self.processor_errors.load(Ordering::Relaxed),
            packets_collected: self.packets_collected.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSnapshot {
    /// Events admitted by the collector
    pub events_accepted: u64,
    /// Events rejected at admission
    pub events_rejected: u64,
    /// Events fanned out to processors
    pub events_dispatched: u64,
    /// Dispatches skipped because the payload holder was gone
    pub payloads_expired: u64,
    /// Processor failures
    pub processor_errors: u64,
    /// Packets handed to the buffer
    pub packets_collected: u64,
    /// Non-empty buffer flushes
    pub flushes: u64,
    /// Flushes that lost packet groups
    pub flush_failures: u64,
}

impl PipelineSnapshot {
    /// Calculate admission success rate (0.0 - 1.0)
    ///
    /// Returns None if no events have been submitted.
    #[inline]
    pub fn admission_rate(&self) -> Option<f64> {
        let total = self.events_accepted + self.events_rejected;
        if total == 0 {
            None
        } else {
            Some(self.events_accepted as f64 / total as f64)
        }
    }
}

/// Handle for reading pipeline metrics externally
///
/// Remains valid after the pipeline shuts down.
#[derive(Debug, Clone)]
pub struct PipelineMetricsHandle {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMetricsHandle {
    /// Wrap shared metrics in a handle
    pub(crate) fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    /// Get a point-in-time snapshot
    #[inline]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot(), PipelineSnapshot::default());
    }

    #[test]
    fn test_record_admission() {
        let metrics = PipelineMetrics::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_rejected();

        let s = metrics.snapshot();
        assert_eq!(s.events_accepted, 2);
        assert_eq!(s.events_rejected, 1);
    }

    #[test]
    fn test_admission_rate() {
        let s = PipelineSnapshot {
            events_accepted: 9,
            events_rejected: 1,
            ..Default::default()
        };
        assert_eq!(s.admission_rate(), Some(0.9));
    }

    #[test]
    fn test_admission_rate_empty() {
        assert_eq!(PipelineSnapshot::default().admission_rate(), None);
    }

    #[test]
    fn test_handle_outlives_usage() {
        let metrics = Arc::new(PipelineMetrics::new());
        let handle = PipelineMetricsHandle::new(Arc::clone(&metrics));
        metrics.record_flush();
        drop(metrics);
        assert_eq!(handle.snapshot().flushes, 1);
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let metrics = Arc::new(PipelineMetrics::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_accepted();
                    m.record_packet_collected();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let s = metrics.snapshot();
        assert_eq!(s.events_accepted, 4000);
        assert_eq!(s.packets_collected, 4000);
    }
}
