//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Card event as posted by clients.
///
/// Every field is optional at the wire level so that a missing field is
/// reported by name instead of as an unreadable body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEventRequest {
    /// Order type (at most 30 characters)
    #[serde(default)]
    pub order_type: Option<String>,

    /// Client session identifier
    #[serde(default)]
    pub session_id: Option<String>,

    /// Card reference (at most 16 characters)
    #[serde(default)]
    pub card: Option<String>,

    /// Event timestamp, RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC)
    #[serde(default)]
    pub event_date: Option<String>,

    /// Originating website
    #[serde(default)]
    pub website_url: Option<String>,
}

/// Confirmation returned once an event is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Operation status
    pub status: String,

    /// Status message
    pub message: String,

    /// Identifier of the stored event
    pub id: i64,
}
