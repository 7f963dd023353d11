//! In-memory event store.
//!
//! Mirrors the PostgreSQL store's claim semantics for tests and local runs.
//! The mutex plays the part of the row lock: a claim selects and flips rows
//! while holding it, so concurrent claims can never overlap.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{ClaimedRow, EventStore};
use crate::error::StoreError;
use crate::event::{CartEvent, EventStatus, NewCartEvent, StatusCounts};

#[derive(Default)]
struct Inner {
    next_id: i64,
    events: BTreeMap<i64, CartEvent>,
}

/// Event store kept entirely in process memory.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave a half-applied claim
        // behind, so the data is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of every stored event in id order.
    pub fn events(&self) -> Vec<CartEvent> {
        self.lock().events.values().cloned().collect()
    }

    /// Status of one event, if it exists.
    pub fn status_of(&self, id: i64) -> Option<EventStatus> {
        self.lock().events.get(&id).map(|e| e.status)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: NewCartEvent) -> Result<CartEvent, StoreError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let stored = CartEvent {
            id: inner.next_id,
            order_type: event.order_type,
            session_id: event.session_id,
            card: event.card,
            event_date: event.event_date,
            website_url: event.website_url,
            status: EventStatus::Pending,
            created_at: Utc::now(),
        };
        inner.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<ClaimedRow>, StoreError> {
        let mut inner = self.lock();
        let claimed = inner
            .events
            .values_mut()
            .filter(|e| e.status == EventStatus::Pending)
            .take(limit as usize)
            .map(|e| {
                e.status = EventStatus::Processing;
                Ok(e.clone())
            })
            .collect();
        Ok(claimed)
    }

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        if let Some(event) = self.lock().events.get_mut(&id) {
            if event.status == EventStatus::Processing {
                event.status = EventStatus::Processed;
            }
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<CartEvent>, StoreError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let mut counts = StatusCounts::default();
        for event in self.lock().events.values() {
            counts.record(event.status, 1);
        }
        Ok(counts)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample(n: usize) -> NewCartEvent {
        NewCartEvent {
            order_type: "purchase".to_string(),
            session_id: format!("session-{n}"),
            card: "4111111111111111".to_string(),
            event_date: Utc::now(),
            website_url: "https://shop.example".to_string(),
        }
    }

    async fn claim_ids(store: &MemoryEventStore, limit: u32) -> Vec<i64> {
        store
            .claim_batch(limit)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.unwrap().id)
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryEventStore::new();
        let a = store.insert(sample(0)).await.unwrap();
        let b = store.insert(sample(1)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.status, EventStatus::Pending);
    }

    #[tokio::test]
    async fn test_claim_is_oldest_first_and_flips_status() {
        let store = MemoryEventStore::new();
        for n in 0..5 {
            store.insert(sample(n)).await.unwrap();
        }

        let ids = claim_ids(&store, 3).await;
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.status_of(1), Some(EventStatus::Processing));
        assert_eq!(store.status_of(4), Some(EventStatus::Pending));
    }

    #[tokio::test]
    async fn test_back_to_back_claims_are_disjoint() {
        let store = MemoryEventStore::new();
        for n in 0..15 {
            store.insert(sample(n)).await.unwrap();
        }

        let first: HashSet<i64> = claim_ids(&store, 10).await.into_iter().collect();
        let pending_after_first = store.count_by_status().await.unwrap().pending;
        let second: HashSet<i64> = claim_ids(&store, 10).await.into_iter().collect();

        assert!(first.is_disjoint(&second));
        assert_eq!(first.len(), 10);
        assert!(second.len() as i64 <= pending_after_first);
        assert_eq!(second.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_claim() {
        let store = MemoryEventStore::new();
        assert!(store.claim_batch(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_processed_only_from_processing() {
        let store = MemoryEventStore::new();
        let event = store.insert(sample(0)).await.unwrap();

        store.mark_processed(event.id).await.unwrap();
        assert_eq!(store.status_of(event.id), Some(EventStatus::Pending));

        claim_ids(&store, 1).await;
        store.mark_processed(event.id).await.unwrap();
        assert_eq!(store.status_of(event.id), Some(EventStatus::Processed));

        let counts = store.count_by_status().await.unwrap();
        assert_eq!(counts.processed, 1);
        assert_eq!(counts.total(), 1);
    }
}
