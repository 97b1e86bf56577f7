//! Pipeline assembly
//!
//! `Pipeline` wires store, packet buffer, dispatcher and collector
//! together with explicit construction and shutdown ordering. Components
//! never reach for global state; everything is passed by reference.

use std::sync::Arc;

use beacon_config::Config;
use beacon_protocol::{DataEvent, EventType};
use beacon_store::PacketStore;
use tokio::runtime::Handle;

use crate::buffer::PacketCollector;
use crate::collector::EventCollector;
use crate::dispatcher::EventDispatcher;
use crate::metrics::{PipelineMetrics, PipelineMetricsHandle};
use crate::processor::Processor;
use crate::registry::ProcessorRegistry;
use crate::Result;

/// The assembled collection pipeline
///
/// # Example
///
/// ```ignore
/// let config = Config::from_file("beacon.toml")?;
/// let pipeline = Pipeline::new(&config, Handle::current())?;
///
/// pipeline.register_processor(Arc::new(GpsProcessor::new()));
/// pipeline.submit(DataEvent::new(EventType::Location, Priority::Medium));
///
/// // At app teardown:
/// pipeline.shutdown();
/// ```
pub struct Pipeline {
    registry: Arc<ProcessorRegistry>,
    store: Arc<PacketStore>,
    packets: Arc<PacketCollector>,
    collector: Arc<EventCollector>,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    /// Validate the configuration and construct the wired pipeline
    ///
    /// Construction order: store, then packet buffer, then dispatcher,
    /// then collector. Shutdown runs the same chain in reverse.
    pub fn new(config: &Config, handle: Handle) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(PipelineMetrics::new());
        let store = Arc::new(PacketStore::new(&config.store)?);
        let packets = Arc::new(PacketCollector::new(
            config.pipeline.packet_limit,
            Arc::clone(&store),
            Arc::clone(&metrics),
        ));
        let registry = Arc::new(ProcessorRegistry::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&packets),
            Arc::clone(&metrics),
        ));
        let collector = Arc::new(EventCollector::new(
            &config.pipeline,
            dispatcher,
            handle,
            Arc::clone(&metrics),
        ));

        tracing::info!(
            soft_cap = config.pipeline.soft_cap,
            hard_cap = config.pipeline.hard_cap,
            packet_limit = config.pipeline.packet_limit,
            directory = %config.store.directory.display(),
            "pipeline started"
        );

        Ok(Self {
            registry,
            store,
            packets,
            collector,
            metrics,
        })
    }

    /// Submit an event; returns `false` if admission rejected it
    #[inline]
    pub fn submit(&self, event: DataEvent) -> bool {
        self.collector.submit(event)
    }

    /// Register a processor (idempotent by name)
    pub fn register_processor(&self, processor: Arc<dyn Processor>) {
        self.registry.register(processor);
    }

    /// Deregister a processor by name
    pub fn deregister_processor(&self, name: &str) -> bool {
        self.registry.deregister(name)
    }

    /// Cancel the repeating registrations of one event type
    pub fn cancel(&self, event_type: EventType) {
        self.collector.cancel(event_type);
    }

    /// Flush buffered packets to the store
    ///
    /// For lifecycle callbacks (app pause); a no-op on an empty buffer.
    pub fn flush(&self) {
        self.packets.flush();
    }

    /// Get the underlying packet store
    #[inline]
    pub fn store(&self) -> &Arc<PacketStore> {
        &self.store
    }

    /// Get a metrics handle that stays valid after shutdown
    pub fn metrics(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// Current pending dispatch count
    pub fn pending_events(&self) -> usize {
        self.collector.pending_count()
    }

    /// Shut the pipeline down
    ///
    /// Stops admission and drops queued dispatches, then flushes the
    /// packet buffer one final time so no accepted event is lost.
    pub fn shutdown(self) {
        self.collector.shut_down();
        self.packets.flush();

        let s = self.metrics.snapshot();
        tracing::info!(
            events_accepted = s.events_accepted,
            events_rejected = s.events_rejected,
            events_dispatched = s.events_dispatched,
            processor_errors = s.processor_errors,
            packets_collected = s.packets_collected,
            flushes = s.flushes,
            "pipeline shut down"
        );
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry)
            .field("pending", &self.collector.pending_count())
            .finish()
    }
}
