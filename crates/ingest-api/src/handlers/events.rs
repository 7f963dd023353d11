//! Card event ingestion handlers.

use axum::{body::Bytes, extract::State, Json};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{CartEventRequest, IngestResponse};
use crate::services::IngestService;

/// Queue a card event for notification.
///
/// `POST /api/v1/event`
///
/// The body is read as JSON regardless of the `Content-Type` header.
///
/// # Request Body
///
/// ```json
/// {
///   "orderType": "purchase",
///   "sessionId": "a1b2c3",
///   "card": "4111111111111111",
///   "eventDate": "2024-05-01T12:30:00Z",
///   "websiteUrl": "https://shop.example"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "message": "event received and stored",
///   "id": 42
/// }
/// ```
///
/// Malformed or incomplete bodies answer `400`, store failures `500`, both
/// with `{"error": "..."}`.
pub async fn ingest_event(
    State(service): State<IngestService>,
    body: Bytes,
) -> AppResult<Json<IngestResponse>> {
    let request: CartEventRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejecting unreadable event body");
        AppError::BadRequest("invalid body".to_string())
    })?;

    let stored = service.ingest(request).await?;

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
        message: "event received and stored".to_string(),
        id: stored.id,
    }))
}

/// Any method other than `POST` on the ingest route.
pub async fn invalid_method() -> AppError {
    AppError::BadRequest("invalid method".to_string())
}
