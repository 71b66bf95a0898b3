//! HTTP Server Configuration
//!
//! Bind address for one listener, plus the request body limit.

use serde::{Deserialize, Serialize};

/// Default body limit for `POST /logs` (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Largest accepted request body in bytes (default: 1 MiB). Only
    /// routes that read a body use it; the worker endpoints ignore it.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl HttpServerConfig {
    /// Create a config bound to all interfaces on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            host: default_host(),
            port,
            max_body_bytes: default_max_body_bytes(),
        }
    }

    /// Default listener for the ingestion API
    pub fn ingest_default() -> Self {
        Self::with_port(8080)
    }

    /// Default listener for the worker's health endpoint
    pub fn worker_default() -> Self {
        Self::with_port(8081)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
