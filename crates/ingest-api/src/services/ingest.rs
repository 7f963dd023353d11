//! Ingest service: validates posted card events and queues them.

use std::sync::Arc;

use cartnotify_worker_pool::{CartEvent, EventStore, NewCartEvent};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::CartEventRequest;
use crate::result_ext::ResultExt;

/// Column width of `cart_events.order_type`.
pub const MAX_ORDER_TYPE_LEN: usize = 30;

/// Column width of `cart_events.card`.
pub const MAX_CARD_LEN: usize = 16;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Service for queueing card events.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn EventStore>,
}

impl IngestService {
    /// Create a new ingest service.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validate `request` and insert it as a `pending` event.
    pub async fn ingest(&self, request: CartEventRequest) -> AppResult<CartEvent> {
        let event = validate(request)?;

        let stored = self
            .store
            .insert(event)
            .await
            .log("inserting card event")?;

        tracing::debug!(
            event_id = stored.id,
            order_type = %stored.order_type,
            card = %stored.masked_card(),
            "Card event queued"
        );

        Ok(stored)
    }
}

/// Turn a posted body into a storable event.
pub fn validate(request: CartEventRequest) -> AppResult<NewCartEvent> {
    let order_type = required(request.order_type, "orderType")?;
    let session_id = required(request.session_id, "sessionId")?;
    let card = required(request.card, "card")?;
    let event_date = required(request.event_date, "eventDate")?;
    let website_url = required(request.website_url, "websiteUrl")?;

    if order_type.chars().count() > MAX_ORDER_TYPE_LEN {
        return Err(AppError::Validation(format!(
            "orderType must be at most {MAX_ORDER_TYPE_LEN} characters"
        )));
    }
    if card.chars().count() > MAX_CARD_LEN {
        return Err(AppError::Validation(format!(
            "card must be at most {MAX_CARD_LEN} characters"
        )));
    }

    Ok(NewCartEvent {
        order_type,
        session_id,
        card,
        event_date: parse_event_date(&event_date)?,
        website_url,
    })
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// Parse an event timestamp. Values without an offset are taken as UTC.
pub fn parse_event_date(value: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(AppError::Validation(format!(
        "eventDate '{value}' is not a valid timestamp"
    )))
}
