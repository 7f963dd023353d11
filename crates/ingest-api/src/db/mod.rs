//! Database module for the cartnotify server.
//!
//! Owns the PostgreSQL connection pool. Queries against `cart_events` live
//! in the worker pool crate's `PgEventStore`.

pub mod pool;

pub use pool::{create_pool, init_store, DbPool};
