//! Beacon Pipeline - Event collection and packet accumulation
//!
//! The collection side of the telemetry subsystem:
//!
//! ```text
//! host app ──DataEvent──> EventCollector (admission)
//!                              │ scheduled onto the runtime
//!                              v
//!                        EventDispatcher ──> Processor(s)
//!                                                 │ DataPacket
//!                                                 v
//!                          PacketCollector ──flush──> PacketStore
//! ```
//!
//! # Key Design
//!
//! - **Admission control**: a soft cap admits only high-priority events,
//!   a hard cap rejects everything; the check and the enqueue share one
//!   critical section
//! - **Scheduled dispatch**: one-shot and repeating schedules on tokio
//!   timers; dispatch itself runs on the blocking pool
//! - **Isolation**: one processor's failure never starves its siblings
//! - **Explicit wiring**: `Pipeline` constructs and shuts down the
//!   components in order, no global state

mod buffer;
mod collector;
mod dispatcher;
mod error;
mod metrics;
mod pipeline;
mod processor;
mod registry;

pub use buffer::PacketCollector;
pub use collector::EventCollector;
pub use dispatcher::EventDispatcher;
pub use error::{PipelineError, Result};
pub use metrics::{PipelineMetrics, PipelineMetricsHandle, PipelineSnapshot};
pub use pipeline::Pipeline;
pub use processor::Processor;
pub use registry::ProcessorRegistry;

// Test modules - only compiled during testing
#[cfg(test)]
mod buffer_test;
#[cfg(test)]
mod registry_test;
