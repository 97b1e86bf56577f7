//! Processor interface
//!
//! Processors turn one event into zero or more packets. The concrete
//! implementations (GPS, Wi-Fi scan, OS info, bluetooth) live in the host
//! application; the pipeline only knows this contract.

use beacon_protocol::{DataEvent, EventType};

use crate::buffer::PacketCollector;
use crate::Result;

/// Turns one event into zero or more packets
///
/// `process` runs synchronously on a pool thread and may block on I/O.
/// Implementations must tolerate an absent payload: the holder may have
/// vanished between submission and dispatch.
///
/// A returned error is logged and isolated; other processors registered
/// for the same event still run.
pub trait Processor: Send + Sync {
    /// Registration identity, unique across processors
    fn name(&self) -> &'static str;

    /// Event types this processor wants to see
    fn supported_types(&self) -> &[EventType];

    /// Handle one event, emitting packets into the collector
    fn process(&self, event: &DataEvent, packets: &PacketCollector) -> Result<()>;
}
