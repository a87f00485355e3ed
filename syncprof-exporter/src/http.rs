// Syncprof Exporter - HTTP endpoints
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTTP endpoints.
//!
//! | Route | Method | Content |
//! |-------|--------|---------|
//! | `/` | GET | Index page |
//! | `/events` | POST | Push one event or an array of events |
//! | `/values` | GET | All published values, JSON |
//! | `/values/:name` | GET | One published value, JSON |
//! | `/metrics` | GET | Prometheus text format |
//! | `/health` | GET | Liveness |
//! | `/ready` | GET | 200 while the engine is running |
//! | `/status` | GET | Version, uptime, engine state and counters |

use crate::metrics::encode_metrics;
use crate::worker::{IngestHandle, SharedView, SourceEvent};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use syncprof::SourceRegistry;
use tracing::warn;

/// Application state shared across handlers.
pub struct AppState {
    pub ingest: IngestHandle,
    pub view: SharedView,
    pub sources: Vec<String>,
    pub pairs: Vec<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    start_time: Instant,
}

impl AppState {
    pub fn new(registry: &SourceRegistry, ingest: IngestHandle, view: SharedView) -> Self {
        let sources = registry
            .ids()
            .map(|id| registry.name(id).to_string())
            .collect();
        let pairs = registry
            .pairs()
            .map(|(a, b)| format!("{}_vs_{}", registry.name(a), registry.name(b)))
            .collect();
        Self {
            ingest,
            view,
            sources,
            pairs,
            started_at: chrono::Utc::now(),
            start_time: Instant::now(),
        }
    }
}

/// Build the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/events", post(events_handler))
        .route("/values", get(values_handler))
        .route("/values/:name", get(value_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Syncprof Exporter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        .endpoints { background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Syncprof Exporter</h1>
    <p>Update frequency and timestamp offset statistics for a set of sources.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><code>POST /events</code> - Push events</div>
        <div class="endpoint"><a href="/values">/values</a> - Published values (JSON)</div>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/ready">/ready</a> - Readiness check</div>
        <div class="endpoint"><a href="/status">/status</a> - Status information (JSON)</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>syncprof_source_frequency_hz{source,stat}</code> - Update frequency statistics</li>
        <li><code>syncprof_source_last_timestamp_seconds{source}</code> - Latest source timestamp</li>
        <li><code>syncprof_pair_offset_seconds{pair,stat}</code> - Timestamp offset statistics</li>
        <li><code>syncprof_events_total</code> - Events recorded</li>
        <li><code>syncprof_events_rejected_total</code> - Events rejected</li>
    </ul>
</body>
</html>"#,
    )
}

/// One pushed event. The timestamp defaults to the receipt time.
#[derive(Debug, Clone, Deserialize)]
pub struct PushedEvent {
    pub source: String,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Body of `POST /events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventBatch {
    One(PushedEvent),
    Many(Vec<PushedEvent>),
}

impl EventBatch {
    fn into_events(self, received_at: f64) -> Vec<SourceEvent> {
        let pushed = match self {
            EventBatch::One(event) => vec![event],
            EventBatch::Many(events) => events,
        };
        pushed
            .into_iter()
            .map(|p| SourceEvent {
                source: p.source,
                timestamp: p.timestamp.unwrap_or(received_at),
                value: p.value,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Accepted {
    pub accepted: usize,
}

/// Queue pushed events. Unknown sources are accepted here and rejected by
/// the worker.
async fn events_handler(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<EventBatch>,
) -> Response {
    let events = batch.into_events(crate::now_secs());
    let mut accepted = 0;
    for event in events {
        if let Err(e) = state.ingest.send(event).await {
            warn!("Dropping pushed events: {}", e);
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
        accepted += 1;
    }
    (StatusCode::ACCEPTED, Json(Accepted { accepted })).into_response()
}

/// All published values keyed by metric name.
async fn values_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.view.read().await;
    Json(view.values.clone())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// One published value.
async fn value_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let view = state.view.read().await;
    match view.values.get(&name) {
        Some(&value) => Json(NamedValue { name, value }).into_response(),
        None => (StatusCode::NOT_FOUND, format!("No value for {}", name)).into_response(),
    }
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        encode_metrics(),
    )
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.view.read().await.is_running() && !state.ingest.is_closed() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// Status information response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub started_at: String,
    pub uptime_secs: u64,
    pub engine_state: String,
    pub events_recorded: u64,
    pub events_rejected: u64,
    pub passes: u64,
    pub sources: Vec<String>,
    pub pairs: Vec<String>,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let view = state.view.read().await;
    Json(StatusResponse {
        version: crate::VERSION.to_string(),
        started_at: state.started_at.to_rfc3339(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        engine_state: view.state.to_string(),
        events_recorded: view.events_recorded,
        events_rejected: view.events_rejected,
        passes: view.passes,
        sources: state.sources.clone(),
        pairs: state.pairs.clone(),
    })
}
