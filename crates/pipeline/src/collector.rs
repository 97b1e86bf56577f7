//! Event collector - admission control and scheduled dispatch
//!
//! The entry point of the pipeline. `submit` decides under one lock
//! whether an event may be queued given the current pending count and
//! the event's priority, then schedules its dispatch on the runtime.
//! Repeating events stay registered until cancelled and occupy one
//! pending slot for their lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_config::PipelineConfig;
use beacon_protocol::{DataEvent, EventType, Priority, Schedule};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::EventDispatcher;
use crate::metrics::PipelineMetrics;

/// Shared admission state
///
/// The pending count and the enqueue form one critical section; checking
/// the count and scheduling outside a common lock would race.
#[derive(Debug, Default)]
struct Admission {
    /// Scheduled dispatches not yet completed (repeating ones count once)
    pending: usize,

    /// Set at shutdown; everything is rejected afterwards
    shut_down: bool,
}

/// Admission-controlled entry point for events
pub struct EventCollector {
    dispatcher: Arc<EventDispatcher>,
    admission: Arc<Mutex<Admission>>,

    /// Pending count above which only high-priority events are admitted
    soft_cap: usize,

    /// Pending count above which everything is rejected
    hard_cap: usize,

    /// Runtime the dispatch tasks are spawned onto
    handle: Handle,

    /// Root token; cancelling it drops every queued dispatch
    shutdown: CancellationToken,

    /// Cancellation tokens of live repeating registrations, per type
    periodic: Mutex<HashMap<EventType, Vec<CancellationToken>>>,

    metrics: Arc<PipelineMetrics>,
}

impl EventCollector {
    /// Create a collector scheduling onto the given runtime
    pub fn new(
        config: &PipelineConfig,
        dispatcher: Arc<EventDispatcher>,
        handle: Handle,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            dispatcher,
            admission: Arc::new(Mutex::new(Admission::default())),
            soft_cap: config.soft_cap,
            hard_cap: config.hard_cap,
            handle,
            shutdown: CancellationToken::new(),
            periodic: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    /// Submit an event for scheduled dispatch
    ///
    /// Returns `false` without side effects when the collector is shut
    /// down, the pending count is over the hard cap, or it is over the
    /// soft cap and the event is not high priority. Rejected events are
    /// never retried.
    pub fn submit(&self, event: DataEvent) -> bool {
        let mut admission = self.admission.lock();

        let reject = admission.shut_down
            || admission.pending > self.hard_cap
            || (admission.pending > self.soft_cap && event.priority() < Priority::High);

        if reject {
            let pending = admission.pending;
            drop(admission);
            tracing::trace!(
                event_type = %event.event_type(),
                priority = %event.priority(),
                pending,
                "event rejected at admission"
            );
            self.metrics.record_rejected();
            return false;
        }

        admission.pending += 1;
        // Enqueue while still holding the admission lock.
        self.spawn_scheduled(event);
        drop(admission);

        self.metrics.record_accepted();
        true
    }

    /// Cancel all repeating registrations of one event type
    ///
    /// Firings already handed to the pool still run.
    pub fn cancel(&self, event_type: EventType) {
        let tokens = self.periodic.lock().remove(&event_type).unwrap_or_default();
        for token in &tokens {
            token.cancel();
        }
        if !tokens.is_empty() {
            tracing::debug!(
                event_type = %event_type,
                registrations = tokens.len(),
                "cancelled repeating events"
            );
        }
    }

    /// Stop admitting events and drop queued dispatches
    ///
    /// In-flight dispatches run to completion; delayed and repeating
    /// ones waiting on their timer are dropped.
    pub fn shut_down(&self) {
        self.admission.lock().shut_down = true;
        self.shutdown.cancel();
        tracing::debug!("event collector shut down");
    }

    /// Current pending dispatch count
    pub fn pending_count(&self) -> usize {
        self.admission.lock().pending
    }

    /// Schedule the dispatch task for an accepted event
    fn spawn_scheduled(&self, event: DataEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let admission = Arc::clone(&self.admission);
        let token = self.shutdown.child_token();

        match event.schedule() {
            Schedule::Once { delay } => {
                self.handle.spawn(async move {
                    let fired = tokio::select! {
                        _ = token.cancelled() => false,
                        _ = tokio::time::sleep(delay) => true,
                    };
                    if fired {
                        run_dispatch(&dispatcher, event).await;
                    }
                    admission.lock().pending -= 1;
                });
            }
            Schedule::Repeating { delay, period } => {
                self.periodic
                    .lock()
                    .entry(event.event_type())
                    .or_default()
                    .push(token.clone());

                self.handle.spawn(async move {
                    let mut wait = delay;
                    loop {
                        let fired = tokio::select! {
                            _ = token.cancelled() => false,
                            _ = tokio::time::sleep(wait) => true,
                        };
                        if !fired {
                            break;
                        }
                        // Fixed delay: the next wait starts after the
                        // dispatch finishes, so firings never overlap.
                        run_dispatch(&dispatcher, event.clone()).await;
                        wait = period;
                    }
                    admission.lock().pending -= 1;
                });
            }
        }
    }
}

/// Run one dispatch on the blocking pool
///
/// Processors and the flush path do blocking file I/O and must stay off
/// the async worker threads.
async fn run_dispatch(dispatcher: &Arc<EventDispatcher>, event: DataEvent) {
    let dispatcher = Arc::clone(dispatcher);
    if let Err(e) = tokio::task::spawn_blocking(move || dispatcher.dispatch(&event)).await {
        tracing::warn!(error = %e, "dispatch task failed");
    }
}

impl std::fmt::Debug for EventCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCollector")
            .field("pending", &self.pending_count())
            .field("soft_cap", &self.soft_cap)
            .field("hard_cap", &self.hard_cap)
            .finish()
    }
}
