//! Beacon Store - Durable on-disk packet cache
//!
//! The store persists packet batches between collection and delivery,
//! surviving process restarts and network outages:
//! - `PacketStore` - write path: group, encode, compress, append
//! - `PacketStream` - read path over one shard file
//! - `PacketReader` - read path over the whole cache directory
//! - `ShardLease` - advisory claim keeping reader and writer apart
//!
//! # File Format
//!
//! One file per destination, named `<destination><digit>`, holding
//! concatenated records:
//!
//! ```text
//! [u32 length (big-endian)][deflate-compressed record body]
//! ```
//!
//! The record body is the packet sequence encoding defined in
//! `beacon_protocol`. Total bytes across all files are capped; a write
//! that would exceed the cap is dropped rather than grow the cache.

mod error;
mod lease;
mod path;
mod reader;
mod store;
mod stream;

pub use error::{Result, StoreError};
pub use lease::{sweep_stale_locks, ShardLease};
pub use path::{destination_from_file_name, directory_size, shard_file_name};
pub use reader::{PacketReader, StoredBatch};
pub use store::PacketStore;
pub use stream::PacketStream;

/// Size of the record length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;
