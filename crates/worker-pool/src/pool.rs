//! Worker pool lifecycle.
//!
//! A pool owns a fixed number of [`ClaimLoop`]s sharing one store and one
//! notifier. The caller keeps the returned [`PoolHandle`]; there is no global
//! pool, so several pools can run side by side against the same store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::notifier::Notifier;
use crate::store::EventStore;
use crate::worker::ClaimLoop;

/// Counters shared by all workers of a pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    batches: AtomicU64,
    claimed: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    claim_errors: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStatsSnapshot {
    pub batches: u64,
    pub claimed: u64,
    pub processed: u64,
    pub failed: u64,
    pub claim_errors: u64,
}

impl PoolStats {
    pub(crate) fn record_claimed(&self, rows: usize) {
        if rows > 0 {
            self.batches.fetch_add(1, Ordering::Relaxed);
            self.claimed.fetch_add(rows as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_claim_error(&self) {
        self.claim_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            claimed: self.claimed.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            claim_errors: self.claim_errors.load(Ordering::Relaxed),
        }
    }
}

/// Entry point for starting a pool.
pub struct WorkerPool;

impl WorkerPool {
    /// Spawn `config.count` claim loops on the current tokio runtime.
    pub fn start(
        config: &PoolConfig,
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<PoolHandle, PoolError> {
        config.validate()?;

        let shutdown = CancellationToken::new();
        let stats = Arc::new(PoolStats::default());

        info!(
            worker_count = config.count,
            batch_size = config.batch_size,
            poll_interval_ms = config.poll_interval_ms,
            notifier = notifier.name(),
            "Starting worker pool"
        );

        let workers = (0..config.count)
            .map(|worker_id| {
                let worker = ClaimLoop::new(
                    worker_id,
                    config,
                    store.clone(),
                    notifier.clone(),
                    stats.clone(),
                    shutdown.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        Ok(PoolHandle {
            shutdown,
            workers,
            stats,
        })
    }
}

/// Owner of a running pool.
///
/// Dropping the handle without calling [`PoolHandle::shutdown`] leaves the
/// workers running until the runtime stops.
pub struct PoolHandle {
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl PoolHandle {
    /// Number of workers started.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Shared counters, readable while the pool runs.
    pub fn stats(&self) -> Arc<PoolStats> {
        self.stats.clone()
    }

    /// Stop claiming and wait for every worker to finish its current batch.
    ///
    /// When this returns no worker is executing a claim, a notification or a
    /// status update.
    pub async fn shutdown(self) -> PoolStatsSnapshot {
        info!(worker_count = self.workers.len(), "Initiating graceful shutdown of workers");

        self.shutdown.cancel();

        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task panicked");
            }
        }

        let snapshot = self.stats.snapshot();
        info!(
            processed = snapshot.processed,
            failed = snapshot.failed,
            "Worker pool shutdown complete"
        );
        snapshot
    }
}
