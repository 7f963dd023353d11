//! Error types for the worker pool.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by an [`EventStore`](crate::store::EventStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A returned row could not be decoded into an event
    #[error("Decode error: {0}")]
    Decode(String),

    /// Schema creation failed
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Errors raised by a [`Notifier`](crate::notifier::Notifier).
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The delivery call could not be completed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The receiving endpoint answered with a non-success status
    #[error("Notification rejected with status {status}")]
    Rejected { status: u16 },

    /// The delivery call did not finish in time
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Errors raised when starting a worker pool.
#[derive(Error, Debug)]
pub enum PoolError {
    /// Configuration error
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}
