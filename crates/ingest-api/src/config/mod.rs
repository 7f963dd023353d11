//! Configuration module for the cartnotify server.
//!
//! This module provides configuration loading from environment variables
//! using the `envy` crate for type-safe environment variable parsing.
//! Worker pool and notifier settings live in `cartnotify_worker_pool::config`.

mod app;
mod database;

pub use app::AppConfig;
pub use database::DatabaseConfig;
