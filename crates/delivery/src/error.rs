//! Delivery error types

use std::io;
use std::path::PathBuf;

use beacon_protocol::DestinationId;
use thiserror::Error;

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors that abort a delivery run before any batch is touched
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No transport the network policy admits is available
    #[error("no usable network transport available")]
    NetworkUnavailable,

    /// The cache directory could not be accessed
    #[error("cache directory '{path}' unavailable: {source}")]
    CacheUnavailable {
        /// The cache directory
        path: PathBuf,
        /// Underlying store error
        #[source]
        source: beacon_store::StoreError,
    },
}

/// A failed network submission, reported by a sender
///
/// Leaves the source file in place; the next delivery run retries it.
#[derive(Debug, Error)]
#[error("submission to '{destination}' failed: {message}")]
pub struct SendError {
    destination: DestinationId,
    message: String,
}

impl SendError {
    /// Create a send error for a destination
    pub fn new(destination: DestinationId, message: impl Into<String>) -> Self {
        Self {
            destination,
            message: message.into(),
        }
    }

    /// Create a send error from an I/O failure
    pub fn io(destination: DestinationId, source: io::Error) -> Self {
        Self {
            destination,
            message: source.to_string(),
        }
    }

    /// Get the destination whose submission failed
    #[inline]
    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }
}
