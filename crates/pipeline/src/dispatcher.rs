//! Event dispatcher - fan-out of one event to its processors
//!
//! Runs synchronously on the calling pool thread. A processor failure is
//! logged and isolated; it never prevents sibling processors from seeing
//! the same event.

use std::sync::Arc;

use beacon_protocol::DataEvent;

use crate::buffer::PacketCollector;
use crate::metrics::PipelineMetrics;
use crate::registry::ProcessorRegistry;

/// Fans a dequeued event out to every processor registered for its type
pub struct EventDispatcher {
    registry: Arc<ProcessorRegistry>,
    packets: Arc<PacketCollector>,
    metrics: Arc<PipelineMetrics>,
}

impl EventDispatcher {
    /// Create a dispatcher over the given registry and packet buffer
    pub fn new(
        registry: Arc<ProcessorRegistry>,
        packets: Arc<PacketCollector>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            registry,
            packets,
            metrics,
        }
    }

    /// Dispatch one event to its processors
    ///
    /// Skipped entirely when the event's payload holder has vanished;
    /// an event whose context is gone has nothing left to report.
    pub fn dispatch(&self, event: &DataEvent) {
        if event.payload_expired() {
            tracing::trace!(
                event_type = %event.event_type(),
                "payload holder gone, skipping dispatch"
            );
            self.metrics.record_payload_expired();
            return;
        }

        let processors = self.registry.processors_for(event.event_type());
        if processors.is_empty() {
            tracing::trace!(event_type = %event.event_type(), "no processors registered");
            return;
        }

        for processor in &processors {
            if let Err(e) = processor.process(event, &self.packets) {
                tracing::warn!(
                    processor = processor.name(),
                    event_type = %event.event_type(),
                    error = %e,
                    "processor failed"
                );
                self.metrics.record_processor_error();
            }
        }

        self.metrics.record_dispatched();
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}
