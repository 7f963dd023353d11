//! PostgreSQL-backed event store.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{ClaimedRow, EventStore};
use crate::error::StoreError;
use crate::event::{CartEvent, EventStatus, NewCartEvent, StatusCounts};

/// Schema statements, applied in order by [`PgEventStore::migrate`].
pub const SCHEMA_SQL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cart_events (
        id          BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        order_type  VARCHAR(30)  NOT NULL,
        session_id  TEXT         NOT NULL,
        card        VARCHAR(16)  NOT NULL,
        event_date  TIMESTAMPTZ  NOT NULL,
        website_url TEXT         NOT NULL,
        status      VARCHAR(20)  NOT NULL DEFAULT 'pending',
        created_at  TIMESTAMPTZ  NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS cart_events_pending_idx
        ON cart_events (id)
        WHERE status = 'pending'
    "#,
];

// Lock, flip and return in one statement. SKIP LOCKED makes concurrent
// claimers pass over each other's rows instead of blocking on them.
// UPDATE ... RETURNING has no defined order, hence the outer ORDER BY.
const CLAIM_SQL: &str = r#"
    WITH cte AS (
        SELECT id
        FROM cart_events
        WHERE status = 'pending'
        ORDER BY id
        LIMIT $1
        FOR UPDATE SKIP LOCKED
    ), claimed AS (
        UPDATE cart_events
        SET status = 'processing'
        WHERE id IN (SELECT id FROM cte)
        RETURNING id, order_type, session_id, card, event_date,
                  website_url, status, created_at
    )
    SELECT id, order_type, session_id, card, event_date,
           website_url, status, created_at
    FROM claimed
    ORDER BY id
"#;

/// Event store over a shared sqlx connection pool.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `cart_events` table and its indexes if missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_SQL.iter().copied() {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Migration(e.to_string()))?;
        }

        tracing::info!("cart_events schema ready");
        Ok(())
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: NewCartEvent) -> Result<CartEvent, StoreError> {
        let row = sqlx::query_as::<_, CartEvent>(
            r#"
            INSERT INTO cart_events (order_type, session_id, card, event_date, website_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_type, session_id, card, event_date,
                      website_url, status, created_at
            "#,
        )
        .bind(&event.order_type)
        .bind(&event.session_id)
        .bind(&event.card)
        .bind(event.event_date)
        .bind(&event.website_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<ClaimedRow>, StoreError> {
        let rows = sqlx::query(CLAIM_SQL)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| CartEvent::from_row(row).map_err(|e| StoreError::Decode(e.to_string())))
            .collect())
    }

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE cart_events
            SET status = 'processed'
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<CartEvent>, StoreError> {
        let event = sqlx::query_as::<_, CartEvent>(
            r#"
            SELECT id, order_type, session_id, card, event_date,
                   website_url, status, created_at
            FROM cart_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM cart_events
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<EventStatus>() {
                Ok(status) => counts.record(status, count),
                Err(e) => tracing::warn!(error = %e, count, "Ignoring rows with unknown status"),
            }
        }

        Ok(counts)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use chrono::Utc;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

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

    /// Connects to `TEST_DATABASE_URL` inside a throwaway schema.
    async fn test_store() -> Option<(PgEventStore, PgPool, String)> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("connect to TEST_DATABASE_URL");

        let schema = format!(
            "cartnotify_test_{}_{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("create test schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("parse TEST_DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .expect("connect with test schema");

        let store = PgEventStore::new(pool);
        store.migrate().await.expect("migrate");
        Some((store, admin, schema))
    }

    #[tokio::test]
    async fn test_concurrent_claims_are_disjoint() {
        let Some((store, admin, schema)) = test_store().await else {
            return;
        };

        for n in 0..15 {
            store.insert(sample(n)).await.unwrap();
        }

        let (a, b) = tokio::join!(store.claim_batch(10), store.claim_batch(10));
        let a: Vec<CartEvent> = a.unwrap().into_iter().map(Result::unwrap).collect();
        let b: Vec<CartEvent> = b.unwrap().into_iter().map(Result::unwrap).collect();

        let ids_a: HashSet<i64> = a.iter().map(|e| e.id).collect();
        let ids_b: HashSet<i64> = b.iter().map(|e| e.id).collect();
        assert!(ids_a.is_disjoint(&ids_b));
        assert_eq!(ids_a.len() + ids_b.len(), 15);
        assert!(a.windows(2).all(|w| w[0].id < w[1].id));
        assert!(a.iter().all(|e| e.status == EventStatus::Processing));

        for event in a.iter().chain(b.iter()) {
            store.mark_processed(event.id).await.unwrap();
        }

        let counts = store.count_by_status().await.unwrap();
        assert_eq!(counts.processed, 15);
        assert_eq!(counts.pending, 0);
        assert!(store.claim_batch(10).await.unwrap().is_empty());

        store.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&admin)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_processed_requires_claim() {
        let Some((store, admin, schema)) = test_store().await else {
            return;
        };

        let event = store.insert(sample(0)).await.unwrap();
        assert_eq!(event.status, EventStatus::Pending);

        store.mark_processed(event.id).await.unwrap();
        let stored = store.get(event.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EventStatus::Pending);

        store.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&admin)
            .await
            .unwrap();
    }
}
