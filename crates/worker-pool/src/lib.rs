//! cartnotify worker pool
//!
//! Durable queue core for card-activity notifications. Events are inserted
//! as `pending`, claimed in batches by a fixed pool of workers, handed to a
//! notifier and finally marked `processed`.
//!
//! This crate provides:
//! - [`EventStore`]: the storage capability, with PostgreSQL and in-memory
//!   implementations
//! - [`Notifier`]: the delivery capability, with log and webhook
//!   implementations
//! - [`ClaimLoop`]: the per-worker claim-and-process cycle
//! - [`WorkerPool`] / [`PoolHandle`]: pool start-up and graceful drain
//!
//! Claims use `FOR UPDATE SKIP LOCKED`, so any number of workers, in one
//! process or many, receive disjoint batches from the same table.

pub mod config;
pub mod error;
pub mod event;
pub mod notifier;
pub mod pool;
pub mod store;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{NotifierConfig, PoolConfig};
pub use error::{NotifyError, PoolError, StoreError};
pub use event::{CartEvent, EventStatus, NewCartEvent, StatusCounts};
pub use notifier::Notifier;
pub use pool::{PoolHandle, PoolStats, PoolStatsSnapshot, WorkerPool};
pub use store::{ClaimedRow, EventStore, MemoryEventStore, PgEventStore};
pub use worker::{BatchOutcome, ClaimLoop};
