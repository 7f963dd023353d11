//! Event store capability.
//!
//! The queue needs only a handful of operations from its backing store. All
//! coordination between workers, in this process or any other, happens
//! inside [`EventStore::claim_batch`]; callers hold no locks of their own.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::event::{CartEvent, NewCartEvent, StatusCounts};

pub use memory::MemoryEventStore;
pub use postgres::{PgEventStore, SCHEMA_SQL};

/// One row returned by a claim. Decoding happens per row so that a single
/// bad row does not discard the rest of the batch.
pub type ClaimedRow = Result<CartEvent, StoreError>;

/// Storage operations used by ingestion and by the worker pool.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event with status `pending`.
    async fn insert(&self, event: NewCartEvent) -> Result<CartEvent, StoreError>;

    /// Atomically move up to `limit` pending events to `processing` and return
    /// them in ascending id order.
    ///
    /// Rows locked by a concurrent claim are skipped, never waited on, so two
    /// claims can never return the same row.
    async fn claim_batch(&self, limit: u32) -> Result<Vec<ClaimedRow>, StoreError>;

    /// Mark a claimed event as `processed`. Events not in `processing` are
    /// left untouched.
    async fn mark_processed(&self, id: i64) -> Result<(), StoreError>;

    /// Fetch a single event.
    async fn get(&self, id: i64) -> Result<Option<CartEvent>, StoreError>;

    /// Count events per status.
    async fn count_by_status(&self) -> Result<StatusCounts, StoreError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> bool;
}
