//! Store error types

use std::io;
use std::path::{Path, PathBuf};

use beacon_protocol::{DestinationId, ProtocolError};
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while persisting or reading packet batches
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system operation failed
    #[error("store i/o error on '{path}': {source}")]
    Io {
        /// Path the operation touched
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Packet group could not be encoded
    #[error("failed to encode packet group: {0}")]
    Encode(#[from] ProtocolError),

    /// Writing the group would exceed the cache byte budget
    #[error("cache full for '{destination}': {needed} bytes needed, {budget} byte budget")]
    CacheFull {
        destination: DestinationId,
        needed: u64,
        budget: u64,
    },

    /// Every shard candidate for the destination is currently claimed
    #[error("no writable shard for '{destination}'")]
    NoShardAvailable { destination: DestinationId },

    /// File name does not follow the `<destination><digit>` shard pattern
    #[error("unrecognized shard file name: '{path}'")]
    UnrecognizedShard { path: PathBuf },
}

impl StoreError {
    /// Create an I/O error carrying the path it occurred on
    #[inline]
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a cache full error
    #[inline]
    pub fn cache_full(destination: DestinationId, needed: u64, budget: u64) -> Self {
        Self::CacheFull {
            destination,
            needed,
            budget,
        }
    }
}
