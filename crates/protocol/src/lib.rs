//! Beacon Protocol - Core types for the Beacon telemetry pipeline
//!
//! This crate provides the foundational types that flow through the pipeline:
//! - `DataEvent` - An observation raised by the host application
//! - `EventType` / `Priority` / `Schedule` - Classification and scheduling tags
//! - `DataPacket` - Key/typed-value record bound for one destination
//! - `DestinationId` - Destination identification for sender lookup
//! - Record codec - Serialization of packet sequences for the disk store
//!
//! # Design Principles
//!
//! - **Self-describing records**: Every serialized packet carries a format
//!   version tag so readers can skip records they do not understand
//! - **Defaults over failures**: Typed packet lookups return a caller-supplied
//!   default on absent keys or mismatched types, never an error
//! - **Explicit liveness**: Event payloads are weak references whose liveness
//!   is checked before use; a vanished holder drops the event silently

mod destination;
mod error;
mod event;
mod packet;
mod record;

pub use destination::DestinationId;
pub use error::ProtocolError;
pub use event::{DataEvent, EventType, Priority, Schedule};
pub use packet::{DataPacket, PacketValue};
pub use record::{decode_packets, encode_packets};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Record format version written by this crate
///
/// Version 1 is the only defined format. Readers stop decoding a record
/// at the first packet tagged with an unknown version.
pub const FORMAT_VERSION: i32 = 1;

/// Sanity ceiling for a single length-prefixed record (10 MB)
///
/// A declared length beyond this is treated as corruption.
pub const MAX_RECORD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum encoded size of a single value or key (protects the i32 length prefix)
pub const MAX_VALUE_SIZE: usize = i32::MAX as usize;
