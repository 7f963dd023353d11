//! HTTP handlers for the cartnotify API.

pub mod events;
pub mod health;

pub use events::{ingest_event, invalid_method};
pub use health::{api_health, health_check};
