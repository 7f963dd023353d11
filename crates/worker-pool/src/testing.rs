//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{NotifyError, StoreError};
use crate::event::{CartEvent, EventStatus, NewCartEvent, StatusCounts};
use crate::notifier::Notifier;
use crate::store::{ClaimedRow, EventStore, MemoryEventStore};

pub fn sample_event(n: usize) -> NewCartEvent {
    NewCartEvent {
        order_type: "purchase".to_string(),
        session_id: format!("session-{n}"),
        card: "4111111111111111".to_string(),
        event_date: Utc::now(),
        website_url: "https://shop.example".to_string(),
    }
}

fn stored_event(id: i64) -> CartEvent {
    let new = sample_event(id as usize);
    CartEvent {
        id,
        order_type: new.order_type,
        session_id: new.session_id,
        card: new.card,
        event_date: new.event_date,
        website_url: new.website_url,
        status: EventStatus::Processing,
        created_at: Utc::now(),
    }
}

/// Records every notified id; optionally fails for one id or sleeps per call.
#[derive(Default)]
pub struct RecordingNotifier {
    ids: Mutex<Vec<i64>>,
    fail_id: Option<i64>,
    latency: Duration,
    in_flight: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(id: i64) -> Self {
        Self {
            fail_id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn ids(&self) -> Vec<i64> {
        self.ids.lock().unwrap().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, event: &CartEvent) -> Result<(), NotifyError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_id == Some(event.id) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        self.ids.lock().unwrap().push(event.id);
        Ok(())
    }
}

/// Always fails.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn notify(&self, _event: &CartEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected { status: 503 })
    }
}

/// Never returns.
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn notify(&self, _event: &CartEvent) -> Result<(), NotifyError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Store whose claim query always fails.
pub struct BrokenClaimStore;

#[async_trait]
impl EventStore for BrokenClaimStore {
    async fn insert(&self, _event: NewCartEvent) -> Result<CartEvent, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn claim_batch(&self, _limit: u32) -> Result<Vec<ClaimedRow>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn mark_processed(&self, _id: i64) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get(&self, _id: i64) -> Result<Option<CartEvent>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// In-memory store whose status update always fails after a claim.
pub struct FailingUpdateStore {
    pub inner: MemoryEventStore,
}

impl FailingUpdateStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryEventStore::new(),
        }
    }
}

#[async_trait]
impl EventStore for FailingUpdateStore {
    async fn insert(&self, event: NewCartEvent) -> Result<CartEvent, StoreError> {
        self.inner.insert(event).await
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<ClaimedRow>, StoreError> {
        self.inner.claim_batch(limit).await
    }

    async fn mark_processed(&self, _id: i64) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn get(&self, id: i64) -> Result<Option<CartEvent>, StoreError> {
        self.inner.get(id).await
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        self.inner.count_by_status().await
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}

/// Store that hands out one batch in which a single row fails to decode.
pub struct UndecodableRowStore {
    ids: Vec<i64>,
    bad_id: i64,
    claimed: AtomicBool,
    processed: Mutex<Vec<i64>>,
}

impl UndecodableRowStore {
    pub fn new(ids: Vec<i64>, bad_id: i64) -> Self {
        Self {
            ids,
            bad_id,
            claimed: AtomicBool::new(false),
            processed: Mutex::new(Vec::new()),
        }
    }

    pub fn processed_ids(&self) -> Vec<i64> {
        self.processed.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStore for UndecodableRowStore {
    async fn insert(&self, _event: NewCartEvent) -> Result<CartEvent, StoreError> {
        Err(StoreError::Decode("read-only".to_string()))
    }

    async fn claim_batch(&self, _limit: u32) -> Result<Vec<ClaimedRow>, StoreError> {
        if self.claimed.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self
            .ids
            .iter()
            .map(|&id| {
                if id == self.bad_id {
                    Err(StoreError::Decode("unknown event status: failed".to_string()))
                } else {
                    Ok(stored_event(id))
                }
            })
            .collect())
    }

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        self.processed.lock().unwrap().push(id);
        Ok(())
    }

    async fn get(&self, _id: i64) -> Result<Option<CartEvent>, StoreError> {
        Ok(None)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        Ok(StatusCounts::default())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
