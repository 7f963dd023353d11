//! Worker pool and notifier configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::PoolError;

/// Worker pool configuration.
///
/// Environment variables are prefixed with `WORKER_`:
/// - `WORKER_COUNT`: Number of concurrent claim loops (default: 8)
/// - `WORKER_POLL_INTERVAL_MS`: Wait between claims (default: 1000)
/// - `WORKER_BATCH_SIZE`: Maximum rows per claim (default: 10)
/// - `WORKER_NOTIFY_TIMEOUT_MS`: Upper bound on one notify call (default: 30000)
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers
    #[serde(default = "default_count")]
    pub count: usize,

    /// Polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum events claimed per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Notify call timeout in milliseconds
    #[serde(default = "default_notify_timeout_ms")]
    pub notify_timeout_ms: u64,
}

fn default_count() -> usize {
    8
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_batch_size() -> u32 {
    10
}

fn default_notify_timeout_ms() -> u64 {
    30_000
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("WORKER_").from_env::<PoolConfig>()
    }

    /// Reject settings the pool cannot run with.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.count == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PoolError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(PoolError::InvalidConfig(
                "poll interval must be at least 1ms".to_string(),
            ));
        }
        if self.notify_timeout_ms == 0 {
            return Err(PoolError::InvalidConfig(
                "notify timeout must be at least 1ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            notify_timeout_ms: default_notify_timeout_ms(),
        }
    }
}

/// Notifier configuration.
///
/// Environment variables are prefixed with `NOTIFY_`:
/// - `NOTIFY_WEBHOOK_URL`: Deliver to this URL instead of logging (optional)
/// - `NOTIFY_SIMULATED_LATENCY_MS`: Delay of the log notifier (default: 2000)
/// - `NOTIFY_REQUEST_TIMEOUT_MS`: HTTP timeout of the webhook notifier (default: 10000)
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Webhook URL (optional)
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Simulated delivery latency for the log notifier
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,

    /// Webhook request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_simulated_latency_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl NotifierConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("NOTIFY_").from_env::<NotifierConfig>()
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            simulated_latency_ms: default_simulated_latency_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
