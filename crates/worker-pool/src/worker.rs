//! Claim-and-process loop run by every worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::error::NotifyError;
use crate::event::CartEvent;
use crate::notifier::Notifier;
use crate::pool::PoolStats;
use crate::store::EventStore;

/// Result of one claim cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows returned by the claim, including rows that failed to decode
    pub claimed: usize,
    /// Rows notified and marked processed
    pub processed: usize,
    /// Rows left in `processing` because decode, notify or update failed
    pub failed: usize,
}

/// A single worker: repeatedly claims a batch and processes it row by row.
pub struct ClaimLoop {
    worker_id: usize,
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    batch_size: u32,
    poll_interval: Duration,
    notify_timeout: Duration,
    stats: Arc<PoolStats>,
    shutdown: CancellationToken,
}

impl ClaimLoop {
    pub fn new(
        worker_id: usize,
        config: &PoolConfig,
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        stats: Arc<PoolStats>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            worker_id,
            store,
            notifier,
            batch_size: config.batch_size,
            poll_interval: config.poll_interval(),
            notify_timeout: config.notify_timeout(),
            stats,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled.
    ///
    /// Cancellation is observed only between batches: a batch that has been
    /// claimed is always processed to the end before the loop returns.
    pub async fn run(self) {
        info!(
            worker_id = self.worker_id,
            batch_size = self.batch_size,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Worker starting"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = sleep(self.poll_interval) => {}
            }

            if self.shutdown.is_cancelled() {
                break;
            }

            let outcome = self.run_cycle().await;
            if outcome.claimed > 0 {
                debug!(
                    worker_id = self.worker_id,
                    claimed = outcome.claimed,
                    processed = outcome.processed,
                    failed = outcome.failed,
                    "Batch finished"
                );
            }
        }

        info!(worker_id = self.worker_id, "Worker received shutdown signal, stopped");
    }

    /// Claim one batch and process every row in it.
    pub async fn run_cycle(&self) -> BatchOutcome {
        let rows = match self.store.claim_batch(self.batch_size).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(worker_id = self.worker_id, error = %e, "Error fetching events");
                self.stats.record_claim_error();
                return BatchOutcome::default();
            }
        };

        let mut outcome = BatchOutcome {
            claimed: rows.len(),
            ..BatchOutcome::default()
        };
        self.stats.record_claimed(rows.len());

        for row in rows {
            let event = match row {
                Ok(event) => event,
                Err(e) => {
                    // The row stays in `processing`; nothing here can finalize it.
                    error!(worker_id = self.worker_id, error = %e, "Error scanning row");
                    outcome.failed += 1;
                    self.stats.record_failed();
                    continue;
                }
            };

            if self.process(&event).await {
                outcome.processed += 1;
                self.stats.record_processed();
            } else {
                outcome.failed += 1;
                self.stats.record_failed();
            }
        }

        outcome
    }

    /// Notify and finalize one claimed event. Returns whether it reached
    /// `processed`.
    async fn process(&self, event: &CartEvent) -> bool {
        let delivered = match timeout(self.notify_timeout, self.notifier.notify(event)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.notify_timeout)),
        };

        if let Err(e) = delivered {
            warn!(
                worker_id = self.worker_id,
                event_id = event.id,
                notifier = self.notifier.name(),
                error = %e,
                "Notification failed, event left in processing"
            );
            return false;
        }

        if let Err(e) = self.store.mark_processed(event.id).await {
            error!(
                worker_id = self.worker_id,
                event_id = event.id,
                error = %e,
                "Failed to update event status"
            );
            return false;
        }

        debug!(worker_id = self.worker_id, event_id = event.id, "Event processed");
        true
    }
}
