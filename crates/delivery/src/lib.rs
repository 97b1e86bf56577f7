//! Beacon Delivery - Shipping cached batches to the backend
//!
//! The delivery side of the telemetry subsystem. A `DeliveryWorker`
//! run, triggered by the host's scheduler, drains the disk cache:
//!
//! ```text
//! PacketReader ──StoredBatch──> Sender ──network──> backend
//!       │                                              │
//!       └────── delete source file on success <────────┘
//! ```
//!
//! # Key Design
//!
//! - **Network gated**: runs only on transports the policy admits
//!   (Wi-Fi/ethernet, cellular behind a debug override)
//! - **At-least-once**: a file is deleted only after its batch was
//!   acknowledged; failures leave it for the next run
//! - **Forward compatible**: batches for destinations without a sender
//!   are kept, becoming deliverable once the sender exists

mod error;
mod metrics;
mod network;
mod sender;
mod worker;

pub use error::{DeliveryError, Result, SendError};
pub use metrics::{DeliveryMetrics, DeliveryMetricsHandle, DeliverySnapshot};
pub use network::{DeliveryPolicy, NetworkMonitor, Transport};
pub use sender::{Sender, SenderRegistry};
pub use worker::{DeliveryReport, DeliveryWorker};
