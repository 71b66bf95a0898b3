//! # HTTP Server
//!
//! One listener serving a router built for a process role:
//!
//! - ingest: `POST /logs`
//! - worker: `GET /health`, `GET /metrics`
//! - combined: all of the above on one port

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::ingest_routes::{ingest_routes, IngestState};
use super::observability_routes::observability_routes;
use crate::observability::MetricsRegistry;
use crate::spool::Spool;

/// HTTP server for one process role
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
    role: &'static str,
}

impl HttpServer {
    /// Ingestion API (`POST /logs`)
    pub fn ingest(config: HttpServerConfig, spool: Arc<Spool>) -> Self {
        let state = Arc::new(IngestState::new(spool));
        let router = ingest_routes(state, config.max_body_bytes);
        Self::with_router(config, router, "ingest")
    }

    /// Worker endpoints (`GET /health`, `GET /metrics`)
    pub fn worker(config: HttpServerConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self::with_router(config, observability_routes(metrics), "worker")
    }

    /// Ingestion and worker endpoints on one listener
    pub fn combined(config: HttpServerConfig, spool: Arc<Spool>) -> Self {
        let metrics = Arc::clone(spool.metrics());
        let state = Arc::new(IngestState::new(spool));
        let router = ingest_routes(state, config.max_body_bytes).merge(observability_routes(metrics));
        Self::with_router(config, router, "combined")
    }

    fn with_router(config: HttpServerConfig, router: Router, role: &'static str) -> Self {
        Self {
            config,
            router: router.layer(TraceLayer::new_for_http()),
            role,
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serves until `shutdown` fires, then drains open connections.
    pub async fn start(self, shutdown: CancellationToken) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(role = self.role, addr = %listener.local_addr()?, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!(role = self.role, "HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::SpoolConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn spool(temp_dir: &TempDir) -> Arc<Spool> {
        Arc::new(Spool::open(SpoolConfig::new(temp_dir.path())).unwrap())
    }

    #[test]
    fn test_server_with_custom_port() {
        let temp_dir = TempDir::new().unwrap();
        let server = HttpServer::ingest(HttpServerConfig::with_port(9090), spool(&temp_dir));
        assert_eq!(server.socket_addr(), "0.0.0.0:9090");
    }

    #[tokio::test]
    async fn test_worker_has_no_ingest_route() {
        let server = HttpServer::worker(
            HttpServerConfig::worker_default(),
            Arc::new(MetricsRegistry::new()),
        );
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logs")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_combined_serves_both_roles() {
        let temp_dir = TempDir::new().unwrap();
        let spool = spool(&temp_dir);
        let router = HttpServer::combined(HttpServerConfig::ingest_default(), Arc::clone(&spool))
            .router();

        let health = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let submit = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logs")
                    .body(Body::from(r#"{"service":"api","level":"info","message":"m"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(submit.status(), StatusCode::OK);
        assert_eq!(spool.metrics().entries_enqueued(), 1);
    }

    #[tokio::test]
    async fn test_start_stops_on_cancel() {
        let server = HttpServer::worker(
            HttpServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                max_body_bytes: 1024,
            },
            Arc::new(MetricsRegistry::new()),
        );
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server.start(shutdown.clone()));

        shutdown.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
