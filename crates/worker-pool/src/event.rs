//! Card event model.
//!
//! A card event is the unit of work moved through the queue. Its payload is
//! fixed at insertion; only `status` changes afterwards, and only forwards:
//! `pending -> processing -> processed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use thiserror::Error;

/// Processing status of a card event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Waiting for a worker.
    Pending,
    /// Claimed by exactly one worker.
    Processing,
    /// Notification delivered and recorded.
    Processed,
}

impl EventStatus {
    /// Column value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Processing => "processing",
            EventStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status column held a value outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown event status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventStatus::Pending),
            "processing" => Ok(EventStatus::Processing),
            "processed" => Ok(EventStatus::Processed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A card event as stored in `cart_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEvent {
    /// Store-assigned identifier; ascending order is insertion order
    pub id: i64,

    /// Order type (e.g. "purchase", "refund")
    pub order_type: String,

    /// Client session identifier
    pub session_id: String,

    /// Card reference
    pub card: String,

    /// When the activity happened on the client side
    pub event_date: DateTime<Utc>,

    /// Website the activity originated from
    pub website_url: String,

    /// Current processing status
    pub status: EventStatus,

    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
}

impl CartEvent {
    /// Card reference safe for logs.
    pub fn masked_card(&self) -> String {
        mask_card(&self.card)
    }
}

impl<'r> FromRow<'r, PgRow> for CartEvent {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<EventStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            order_type: row.try_get("order_type")?,
            session_id: row.try_get("session_id")?,
            card: row.try_get("card")?,
            event_date: row.try_get("event_date")?,
            website_url: row.try_get("website_url")?,
            status,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Validated payload for a new card event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartEvent {
    pub order_type: String,
    pub session_id: String,
    pub card: String,
    pub event_date: DateTime<Utc>,
    pub website_url: String,
}

/// Number of events in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub processing: i64,
    pub processed: i64,
}

impl StatusCounts {
    /// Add `count` rows reported for `status`.
    pub fn record(&mut self, status: EventStatus, count: i64) {
        match status {
            EventStatus::Pending => self.pending += count,
            EventStatus::Processing => self.processing += count,
            EventStatus::Processed => self.processed += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.processing + self.processed
    }
}

/// Mask all but the last four characters of a card reference.
pub fn mask_card(card: &str) -> String {
    let chars: Vec<char> = card.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    let tail: String = chars[hidden..].iter().collect();
    format!("{}{}", "*".repeat(hidden), tail)
}
