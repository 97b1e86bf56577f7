//! Delivery worker
//!
//! Invoked periodically by the host's task scheduler. Each run drains the
//! disk cache: read a batch, hand it to its sender, delete the source
//! file only once the submission succeeded. Anything that fails stays on
//! disk for the next run; retry is simply re-reading the file.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use beacon_config::Config;
use beacon_store::PacketReader;

use crate::error::{DeliveryError, Result};
use crate::metrics::{DeliveryMetrics, DeliveryMetricsHandle};
use crate::network::{DeliveryPolicy, NetworkMonitor};
use crate::sender::SenderRegistry;

/// Outcome of one delivery run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Batches submitted successfully
    pub batches_delivered: usize,

    /// Batches whose submission failed and stayed on disk
    pub batches_failed: usize,

    /// Batches skipped (empty or no sender registered)
    pub batches_skipped: usize,

    /// Source files deleted after successful submission
    pub files_deleted: usize,
}

impl DeliveryReport {
    /// Check that nothing failed or was left behind this run
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.batches_failed == 0 && self.batches_skipped == 0
    }
}

/// Background task draining the disk cache to the network
pub struct DeliveryWorker {
    /// Cache directory the reader iterates
    directory: PathBuf,

    senders: Arc<SenderRegistry>,
    monitor: Arc<dyn NetworkMonitor>,
    policy: DeliveryPolicy,
    metrics: Arc<DeliveryMetrics>,
}

impl DeliveryWorker {
    /// Create a worker over the configured cache directory
    pub fn new(
        config: &Config,
        senders: Arc<SenderRegistry>,
        monitor: Arc<dyn NetworkMonitor>,
    ) -> Self {
        Self {
            directory: config.store.directory.clone(),
            senders,
            monitor,
            policy: DeliveryPolicy::new(&config.delivery),
            metrics: Arc::new(DeliveryMetrics::new()),
        }
    }

    /// Get a metrics handle that stays valid across runs
    pub fn metrics(&self) -> DeliveryMetricsHandle {
        DeliveryMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// Run one delivery pass over the cache
    ///
    /// Aborts without side effects when the network policy does not
    /// admit the current transport or the cache directory cannot be
    /// read. Otherwise every readable batch is offered to its sender;
    /// the source file is deleted only on a successful submission.
    pub async fn run(&self) -> Result<DeliveryReport> {
        let transport = self.monitor.current_transport();
        if !self.policy.admits(transport) {
            tracing::debug!(transport = %transport, "delivery skipped, transport not admitted");
            self.metrics.record_run_offline();
            return Err(DeliveryError::NetworkUnavailable);
        }

        let mut reader =
            PacketReader::open(&self.directory).map_err(|source| DeliveryError::CacheUnavailable {
                path: self.directory.clone(),
                source,
            })?;

        self.metrics.record_run();
        tracing::debug!(
            directory = %self.directory.display(),
            transport = %transport,
            senders = self.senders.len(),
            "delivery run started"
        );

        let mut report = DeliveryReport::default();

        while let Some(batch) = reader.load_next() {
            if batch.is_empty() {
                // Every record in the file was corrupt; leave it for a
                // later run rather than drop data the backend never saw.
                self.metrics.record_skipped();
                report.batches_skipped += 1;
                continue;
            }

            let Some(sender) = self.senders.get(batch.destination()) else {
                tracing::debug!(
                    destination = %batch.destination(),
                    "no sender registered, batch kept for later"
                );
                self.metrics.record_skipped();
                report.batches_skipped += 1;
                continue;
            };

            match sender.submit(batch.packets()).await {
                Ok(()) => {
                    self.metrics.record_sent(batch.len() as u64);
                    report.batches_delivered += 1;

                    match fs::remove_file(batch.path()) {
                        Ok(()) => {
                            self.metrics.record_file_deleted();
                            report.files_deleted += 1;
                            tracing::debug!(
                                destination = %batch.destination(),
                                packets = batch.len(),
                                path = %batch.path().display(),
                                "batch delivered, source file deleted"
                            );
                        }
                        Err(e) => {
                            // The batch will be submitted again next run;
                            // the backend dedupes.
                            tracing::warn!(
                                path = %batch.path().display(),
                                error = %e,
                                "delivered batch but could not delete source file"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        destination = %batch.destination(),
                        packets = batch.len(),
                        error = %e,
                        "submission failed, batch kept for retry"
                    );
                    self.metrics.record_failed();
                    report.batches_failed += 1;
                }
            }
        }

        tracing::debug!(
            delivered = report.batches_delivered,
            failed = report.batches_failed,
            skipped = report.batches_skipped,
            files_deleted = report.files_deleted,
            "delivery run finished"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for DeliveryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryWorker")
            .field("directory", &self.directory)
            .field("senders", &self.senders.len())
            .finish()
    }
}
