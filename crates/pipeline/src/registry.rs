//! Processor registry
//!
//! Maps event types to the processors registered for them. Registration
//! is idempotent by processor name: duplicates are logged and ignored.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_protocol::EventType;
use parking_lot::RwLock;

use crate::processor::Processor;

/// Process-lifetime mapping from event types to processors
///
/// Built at startup; later (de)registration is supported and idempotent.
#[derive(Default)]
pub struct ProcessorRegistry {
    by_type: RwLock<HashMap<EventType, Vec<Arc<dyn Processor>>>>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor for every type it supports
    ///
    /// A processor whose name is already registered is ignored.
    pub fn register(&self, processor: Arc<dyn Processor>) {
        let mut by_type = self.by_type.write();

        let duplicate = by_type
            .values()
            .flatten()
            .any(|p| p.name() == processor.name());
        if duplicate {
            tracing::warn!(
                processor = processor.name(),
                "processor already registered, ignoring"
            );
            return;
        }

        tracing::debug!(
            processor = processor.name(),
            types = ?processor.supported_types(),
            "registered processor"
        );

        for ty in processor.supported_types() {
            by_type.entry(*ty).or_default().push(Arc::clone(&processor));
        }
    }

    /// Remove a processor by name from every type
    ///
    /// Returns `true` if anything was removed. Removing an unknown name
    /// is a no-op.
    pub fn deregister(&self, name: &str) -> bool {
        let mut by_type = self.by_type.write();
        let mut removed = false;

        by_type.retain(|_, processors| {
            let before = processors.len();
            processors.retain(|p| p.name() != name);
            removed |= processors.len() != before;
            !processors.is_empty()
        });

        if removed {
            tracing::debug!(processor = name, "deregistered processor");
        }
        removed
    }

    /// Get the processors registered for a type
    pub fn processors_for(&self, event_type: EventType) -> Vec<Arc<dyn Processor>> {
        self.by_type
            .read()
            .get(&event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct registered processors
    pub fn processor_count(&self) -> usize {
        let by_type = self.by_type.read();
        let mut names: Vec<&str> = by_type.values().flatten().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Names of all registered processors (for startup logging)
    pub fn names(&self) -> Vec<&'static str> {
        let by_type = self.by_type.read();
        let mut names: Vec<&'static str> = by_type.values().flatten().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.names())
            .finish()
    }
}
