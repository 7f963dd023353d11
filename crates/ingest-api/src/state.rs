//! Application state for the cartnotify server.
//!
//! This module defines the shared application state that is
//! passed to all handlers via Axum's state management.

use std::sync::Arc;

use cartnotify_worker_pool::{EventStore, PoolStats};

use crate::config::AppConfig;

/// Shared application state.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Event store shared with the worker pool
    pub store: Arc<dyn EventStore>,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Counters of the worker pool running in this process, if any
    pub pool_stats: Option<Arc<PoolStats>>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Event store
    /// * `config` - Application configuration
    /// * `pool_stats` - Counters of the local worker pool
    pub fn new(
        store: Arc<dyn EventStore>,
        config: AppConfig,
        pool_stats: Option<Arc<PoolStats>>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            pool_stats,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
