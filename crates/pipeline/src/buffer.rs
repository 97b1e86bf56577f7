//! Packet collector - in-memory accumulation before the store
//!
//! Packets emitted by processors land here and are flushed to the disk
//! store when the buffer reaches its limit or a lifecycle signal (app
//! pause, shutdown) forces a flush. The buffer is cleared whatever the
//! save outcome: bounded memory wins over retrying a failing disk.

use std::sync::Arc;

use beacon_protocol::DataPacket;
use beacon_store::PacketStore;
use parking_lot::Mutex;

use crate::metrics::PipelineMetrics;

/// Size-triggered accumulation buffer in front of the store
///
/// Both the size trigger and lifecycle flushes go through one mutex, so
/// a flush from an app callback cannot interleave with a triggered one.
pub struct PacketCollector {
    buffer: Mutex<Vec<DataPacket>>,

    /// Buffered packet count that triggers a flush
    limit: usize,

    store: Arc<PacketStore>,
    metrics: Arc<PipelineMetrics>,
}

impl PacketCollector {
    /// Create a collector flushing to the given store
    pub fn new(limit: usize, store: Arc<PacketStore>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(limit)),
            limit,
            store,
            metrics,
        }
    }

    /// Append a packet, flushing first if the buffer is full
    ///
    /// May block briefly on the buffer mutex while another thread
    /// flushes.
    pub fn add(&self, packet: DataPacket) {
        let mut buffer = self.buffer.lock();
        buffer.push(packet);
        self.metrics.record_packet_collected();

        if buffer.len() >= self.limit {
            self.flush_locked(&mut buffer);
        }
    }

    /// Flush the buffer to the store
    ///
    /// An empty buffer performs no I/O. Safe to call from lifecycle
    /// callbacks as well as the size trigger.
    pub fn flush(&self) {
        let mut buffer = self.buffer.lock();
        self.flush_locked(&mut buffer);
    }

    /// Number of packets currently buffered
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    fn flush_locked(&self, buffer: &mut Vec<DataPacket>) {
        if buffer.is_empty() {
            return;
        }

        let batch = std::mem::take(buffer);
        let count = batch.len();

        if !self.store.save(&batch) {
            tracing::warn!(packets = count, "flush lost packet groups");
            self.metrics.record_flush_failure();
        }
        self.metrics.record_flush();

        tracing::trace!(packets = count, "buffer flushed");
    }
}

impl std::fmt::Debug for PacketCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketCollector")
            .field("buffered", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}
