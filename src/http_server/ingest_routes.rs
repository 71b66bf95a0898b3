//! Ingestion HTTP Routes
//!
//! `POST /logs` validates a submission, stamps a timestamp if missing and
//! appends it to the spool. The 200 response is sent only after the append
//! is durable.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error};

use super::errors::{IngestError, IngestResult};
use crate::entry::LogSubmission;
use crate::spool::Spool;

// ==================
// Shared State
// ==================

/// Ingestion state shared across handlers
pub struct IngestState {
    pub spool: Arc<Spool>,
}

impl IngestState {
    pub fn new(spool: Arc<Spool>) -> Self {
        Self { spool }
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub status: &'static str,
}

/// Create ingestion routes
pub fn ingest_routes(state: Arc<IngestState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/logs", post(submit_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Submit handler
///
/// The body is decoded by hand so that every decoding failure is a 400.
async fn submit_handler(
    State(state): State<Arc<IngestState>>,
    body: Bytes,
) -> IngestResult<(StatusCode, Json<QueuedResponse>)> {
    let entry = LogSubmission::from_json(&body)
        .and_then(LogSubmission::into_entry)
        .map_err(|e| {
            debug!(code = e.code(), error = %e, "rejected log submission");
            IngestError::from(e)
        })?;

    let spool = Arc::clone(&state.spool);
    tokio::task::spawn_blocking(move || spool.enqueue(&entry))
        .await
        .map_err(|e| IngestError::Internal(format!("append task failed: {}", e)))?
        .map_err(|e| {
            error!(code = e.code(), error = %e, "failed to enqueue log entry");
            IngestError::from(e)
        })?;

    Ok((StatusCode::OK, Json(QueuedResponse { status: "queued" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::SpoolConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(temp_dir: &TempDir) -> (Router, Arc<Spool>) {
        let spool = Arc::new(Spool::open(SpoolConfig::new(temp_dir.path())).unwrap());
        let router = ingest_routes(Arc::new(IngestState::new(Arc::clone(&spool))), 1024);
        (router, spool)
    }

    fn post_logs(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/logs")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_submission_is_queued() {
        let temp_dir = TempDir::new().unwrap();
        let (router, spool) = app(&temp_dir);

        let response = router
            .oneshot(post_logs(r#"{"service":"api","level":"info","message":"boot"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "queued"}));
        assert_eq!(spool.appended(), 1);

        let content = fs::read_to_string(spool.layout().active_path()).unwrap();
        let stored: serde_json::Value = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(stored["service"], "api");
        assert!(stored["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_and_not_enqueued() {
        let temp_dir = TempDir::new().unwrap();
        let (router, spool) = app(&temp_dir);

        let response = router.oneshot(post_logs("{oops")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(spool.pending_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_400() {
        let temp_dir = TempDir::new().unwrap();
        let (router, spool) = app(&temp_dir);

        let response = router
            .oneshot(post_logs(r#"{"service":"api","level":"info"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("message"));
        assert_eq!(spool.appended(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let temp_dir = TempDir::new().unwrap();
        let (router, spool) = app(&temp_dir);
        fs::create_dir(spool.layout().active_path()).unwrap();

        let response = router
            .oneshot(post_logs(r#"{"service":"api","level":"info","message":"m"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (router, spool) = app(&temp_dir);
        let body = format!(
            r#"{{"service":"api","level":"info","message":"{}"}}"#,
            "x".repeat(4096)
        );

        let response = router.oneshot(post_logs(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(spool.appended(), 0);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let (router, _spool) = app(&temp_dir);

        let response = router
            .oneshot(Request::builder().uri("/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
