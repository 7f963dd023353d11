//! cartnotify ingest API
//!
//! HTTP front of the card-event notification queue:
//!
//! - **Ingestion**: `POST /api/v1/event` validates a card event and stores it
//!   as `pending`
//! - **Health**: `GET /health` and `GET /api/health`
//!
//! The `cartnotify-server` binary also runs the worker pool from
//! [`cartnotify_worker_pool`] against the same PostgreSQL table, and drains
//! it on shutdown.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`db`]: Connection pool and schema initialization
//! - [`error`]: Custom error types with Axum integration
//! - [`handlers`]: HTTP route handlers
//! - [`router`]: Route table
//! - [`services`]: Validation and insertion
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cartnotify_ingest_api::{config::AppConfig, router::build_router, state::AppState};
//! use cartnotify_worker_pool::MemoryEventStore;
//!
//! let state = AppState::new(Arc::new(MemoryEventStore::new()), AppConfig::default(), None);
//! let app = build_router(state);
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod result_ext;
pub mod router;
pub mod services;
pub mod state;

pub use error::{AppError, AppResult};
pub use result_ext::ResultExt;
