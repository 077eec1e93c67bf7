//! HTTP server for ingesting voice events and serving windowed metrics.
//!
//! This module provides an HTTP server that:
//! - Accepts one JSON event per request via POST /ingest
//! - Serves a plaintext metrics listing via GET /metrics
//! - Serves a JSON report via GET /report
//!
//! # Architecture
//!
//! ```text
//! Producer ──→ POST /ingest ──→ validate ──→ SharedEventStore
//!                                                 │
//!              GET /metrics ◀── format ◀── aggregate (prune at now)
//!              GET /report  ◀── round  ◀──┘
//! ```

use crate::config::Config;
use crate::core::{RetentionPolicy, SharedEventStore};
use crate::event::parse_event;
use crate::report::{format_metrics, Report, METRICS_CONTENT_TYPE};
use crate::stats::IngestStatsSnapshot;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Retention policy for the event store
    pub policy: RetentionPolicy,
}

impl ServerConfig {
    /// Create a new server configuration bound to localhost
    pub fn new(port: u16, policy: RetentionPolicy) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            policy,
        }
    }

    /// Build from the loaded service configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            policy: config.retention_policy(),
        }
    }
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub retained: usize,
    pub time_window_secs: i64,
    pub max_events: usize,
    #[serde(flatten)]
    pub counters: IngestStatsSnapshot,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// GET /health
async fn health(State(store): State<SharedEventStore>) -> Json<HealthResponse> {
    let policy = store.policy();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        retained: store.retained(Utc::now()).len(),
        time_window_secs: policy.time_window.num_seconds(),
        max_events: policy.max_events,
        counters: store.stats().snapshot(),
    })
}

/// POST /ingest
///
/// Validates the body and appends the event to the store.
async fn ingest(
    State(store): State<SharedEventStore>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), (StatusCode, Json<ErrorResponse>)> {
    let event = parse_event(&body).map_err(|e| {
        store.record_rejected();
        tracing::warn!("Rejected event payload: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                code: e.code().to_string(),
            }),
        )
    })?;

    let session_id = event.session_id.clone();
    let evicted = store.ingest(event);
    tracing::debug!(session_id = %session_id, evicted, "Event ingested");

    Ok((StatusCode::OK, "Event received"))
}

/// GET /metrics
async fn metrics(State(store): State<SharedEventStore>) -> impl IntoResponse {
    let snapshot = store.query(Utc::now());
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        format_metrics(&snapshot),
    )
}

/// GET /report
async fn report(State(store): State<SharedEventStore>) -> Json<Report> {
    let snapshot = store.query(Utc::now());
    Json(Report::from(&snapshot))
}

/// Whether a browser origin is served from this machine, on any port
fn is_local_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Some(authority) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };
    let port_ok = port.map_or(true, |p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));

    port_ok && matches!(host, "localhost" | "127.0.0.1")
}

/// Build the router over an existing store
pub fn router(store: SharedEventStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/metrics", get(metrics))
        .route("/report", get(report))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(|origin, _parts| {
                    is_local_origin(origin)
                }))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(store)
}

/// Run the HTTP server with a fresh store
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let store = SharedEventStore::new(config.policy);
    run_with_store(config, store).await
}

/// Run the HTTP server over the given store
pub async fn run_with_store(
    config: ServerConfig,
    store: SharedEventStore,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = router(store);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!(
        "Voice metrics server listening on http://{} (window: {}s, max events: {})",
        actual_addr,
        config.policy.time_window.num_seconds(),
        config.policy.max_events
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(origin: &'static str) -> bool {
        is_local_origin(&HeaderValue::from_static(origin))
    }

    #[test]
    fn test_local_origins_on_any_port() {
        assert!(local("http://localhost"));
        assert!(local("http://localhost:3000"));
        assert!(local("http://127.0.0.1:8080"));
        assert!(local("https://localhost:5173"));
    }

    #[test]
    fn test_foreign_origins_refused() {
        assert!(!local("http://example.com"));
        assert!(!local("http://localhost.example.com"));
        assert!(!local("http://127.0.0.1.nip.io:3000"));
        assert!(!local("http://localhost:"));
        assert!(!local("http://localhost:30a0"));
        assert!(!local("null"));
    }
}
