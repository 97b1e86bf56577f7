//! Tests for ProcessorRegistry

use std::sync::Arc;

use beacon_protocol::{DataEvent, EventType};

use crate::buffer::PacketCollector;
use crate::processor::Processor;
use crate::registry::ProcessorRegistry;
use crate::Result;

struct NamedProcessor {
    name: &'static str,
    types: Vec<EventType>,
}

impl NamedProcessor {
    fn new(name: &'static str, types: Vec<EventType>) -> Arc<Self> {
        Arc::new(Self { name, types })
    }
}

impl Processor for NamedProcessor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported_types(&self) -> &[EventType] {
        &self.types
    }

    fn process(&self, _event: &DataEvent, _packets: &PacketCollector) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Registration tests
// =============================================================================

#[test]
fn test_register_and_lookup() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));

    let found = registry.processors_for(EventType::Location);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "gps");
}

#[test]
fn test_lookup_unregistered_type_is_empty() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));

    assert!(registry.processors_for(EventType::WifiScan).is_empty());
}

#[test]
fn test_register_multiple_types() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new(
        "radio",
        vec![EventType::WifiScan, EventType::BluetoothScan],
    ));

    assert_eq!(registry.processors_for(EventType::WifiScan).len(), 1);
    assert_eq!(registry.processors_for(EventType::BluetoothScan).len(), 1);
    assert_eq!(registry.processor_count(), 1);
}

#[test]
fn test_multiple_processors_per_type() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));
    registry.register(NamedProcessor::new("geo_ip", vec![EventType::Location]));

    assert_eq!(registry.processors_for(EventType::Location).len(), 2);
    assert_eq!(registry.processor_count(), 2);
}

#[test]
fn test_duplicate_registration_ignored() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));
    registry.register(NamedProcessor::new("gps", vec![EventType::WifiScan]));

    assert_eq!(registry.processors_for(EventType::Location).len(), 1);
    // The duplicate's extra type was ignored with the rest of it.
    assert!(registry.processors_for(EventType::WifiScan).is_empty());
    assert_eq!(registry.processor_count(), 1);
}

// =============================================================================
// Deregistration tests
// =============================================================================

#[test]
fn test_deregister_removes_everywhere() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new(
        "radio",
        vec![EventType::WifiScan, EventType::BluetoothScan],
    ));

    assert!(registry.deregister("radio"));
    assert!(registry.processors_for(EventType::WifiScan).is_empty());
    assert!(registry.processors_for(EventType::BluetoothScan).is_empty());
    assert_eq!(registry.processor_count(), 0);
}

#[test]
fn test_deregister_unknown_is_noop() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));

    assert!(!registry.deregister("nope"));
    assert_eq!(registry.processor_count(), 1);
}

#[test]
fn test_register_again_after_deregister() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));
    registry.deregister("gps");
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));

    assert_eq!(registry.processors_for(EventType::Location).len(), 1);
}

// =============================================================================
// Introspection tests
// =============================================================================

#[test]
fn test_names_sorted_and_unique() {
    let registry = ProcessorRegistry::new();
    registry.register(NamedProcessor::new(
        "radio",
        vec![EventType::WifiScan, EventType::BluetoothScan],
    ));
    registry.register(NamedProcessor::new("gps", vec![EventType::Location]));

    assert_eq!(registry.names(), vec!["gps", "radio"]);
}
