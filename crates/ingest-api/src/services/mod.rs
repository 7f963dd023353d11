//! Business logic services for the cartnotify server.

pub mod ingest;

pub use ingest::IngestService;
