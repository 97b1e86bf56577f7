//! Sender interface and registry
//!
//! A `Sender` knows how to turn a batch of packets into a network
//! submission for one destination. The concrete transports (HTTP client,
//! mutation encoding) live in the host application.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use beacon_protocol::{DataPacket, DestinationId};
use parking_lot::RwLock;

use crate::error::SendError;

/// Submits one destination's batches to the backend
///
/// `submit` resolves once the backend acknowledged or refused the batch;
/// its result decides whether the source file is deleted or retried.
#[async_trait]
pub trait Sender: Send + Sync {
    /// The destination this sender handles
    fn destination(&self) -> DestinationId;

    /// Submit one batch; `Ok` means the backend accepted it
    async fn submit(&self, packets: &[DataPacket]) -> Result<(), SendError>;
}

/// Process-lifetime mapping from destination ids to senders
///
/// Registration is idempotent: a duplicate destination is logged and
/// ignored. A batch whose destination has no sender is skipped and kept
/// on disk; it becomes deliverable once the sender is registered (after
/// an app update, typically).
#[derive(Default)]
pub struct SenderRegistry {
    senders: RwLock<HashMap<DestinationId, Arc<dyn Sender>>>,
}

impl SenderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender for its destination
    pub fn register(&self, sender: Arc<dyn Sender>) {
        let destination = sender.destination();
        let mut senders = self.senders.write();

        if senders.contains_key(&destination) {
            tracing::warn!(
                destination = %destination,
                "sender already registered, ignoring"
            );
            return;
        }

        tracing::debug!(destination = %destination, "registered sender");
        senders.insert(destination, sender);
    }

    /// Look up the sender for a destination
    pub fn get(&self, destination: &DestinationId) -> Option<Arc<dyn Sender>> {
        self.senders.read().get(destination).cloned()
    }

    /// Number of registered senders
    pub fn len(&self) -> usize {
        self.senders.read().len()
    }

    /// Check if no senders are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destinations with a registered sender (for startup logging)
    pub fn destinations(&self) -> Vec<DestinationId> {
        let mut destinations: Vec<DestinationId> =
            self.senders.read().keys().cloned().collect();
        destinations.sort();
        destinations
    }
}

impl std::fmt::Debug for SenderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderRegistry")
            .field("destinations", &self.destinations())
            .finish()
    }
}
