//! HTTP surface: webhook intake, manual test routes and health.

use crate::radar::{MetricsSnapshot, MintRadar, MintReport, ScoreResult};
use crate::types::MintTrigger;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub radar: Arc<MintRadar>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(radar: Arc<MintRadar>) -> Self {
        Self {
            radar,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookResponse {
    ok: bool,
    results: Vec<MintReport>,
}

#[derive(Debug, Serialize)]
struct ManualScanResponse {
    ok: bool,
    score: ScoreResult,
    resp: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    metrics: MetricsSnapshot,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/helius", post(webhook_handler))
        .route("/test/:mint", get(manual_scan_handler))
        .route("/test", get(test_message_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve the router on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Mint radar listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Mint radar stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// An empty configured secret rejects every caller.
fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    let expected = secret.trim();
    if expected.is_empty() {
        return false;
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim() == expected)
        .unwrap_or(false)
}

#[instrument(skip_all)]
async fn webhook_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if !is_authorized(&headers, &state.radar.config().webhook_secret) {
        warn!("Rejected webhook call with missing or wrong authorization");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "ok": false, "error": "unauthorized" })),
        )
            .into_response();
    }

    let trigger = MintTrigger::from_body(&body);
    info!("Webhook trigger with {} mint(s)", trigger.mints.len());

    let mut results = Vec::with_capacity(trigger.mints.len());
    for mint in &trigger.mints {
        results.push(state.radar.process_mint(mint).await);
    }

    Json(WebhookResponse { ok: true, results }).into_response()
}

async fn manual_scan_handler(State(state): State<AppState>, Path(mint): Path<String>) -> Response {
    let scan = state.radar.scan_and_notify(mint.trim()).await;

    Json(ManualScanResponse {
        ok: scan.delivery.ok,
        score: scan.score,
        resp: scan.delivery.response,
    })
    .into_response()
}

async fn test_message_handler(State(state): State<AppState>) -> Response {
    let report = state.radar.send_test_message().await;
    if !report.ok {
        warn!("Test message was not delivered");
    }

    Json(json!({
        "status": "ok",
        "message": "Test alert sent to Telegram",
    }))
    .into_response()
}

async fn health_handler(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        metrics: state.radar.metrics(),
    })
    .into_response()
}
