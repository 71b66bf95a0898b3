//! # HTTP Server Module
//!
//! Network surface of logspool, built on Axum.
//!
//! # Endpoints
//!
//! - `POST /logs` - Submit a log entry (ingest role)
//! - `GET /health` - Liveness probe (worker role)
//! - `GET /metrics` - Spool counters (worker role)

pub mod config;
pub mod errors;
pub mod ingest_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{IngestError, IngestResult};
pub use server::HttpServer;
