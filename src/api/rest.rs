// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The desk serves a browser front end,
// so CORS is configured permissively for development; tighten
// `allowed_origins` in production.
//
// Error contract: every failure is a JSON body with an `error` key and a
// status that distinguishes the categories — 400 for caller mistakes and
// domain conditions (market closed, not enough history), 404 for unknown
// tickers, 502 for upstream quote failures, 500/503 for the chat proxy.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::chart::{compute_indicators, ChartColumns};
use crate::market_data::{build_snapshot, SnapshotError};

/// JSON error body + status, shared by every handler.
type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/chart/:symbol", get(chart))
        .route("/api/v1/snapshot", get(snapshot))
        .route("/api/v1/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    tickers: usize,
    recent_errors: Vec<crate::app_state::ErrorRecord>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        tickers: state.bar_store.tickers().len(),
        recent_errors: state.recent_errors.read().clone(),
    })
}

// =============================================================================
// Chart
// =============================================================================

#[derive(Deserialize)]
struct ChartRange {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// Parse a `YYYY-MM-DD` query value, falling back to the configured default.
fn resolve_date(raw: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, ApiError> {
    match raw {
        None => Ok(fallback),
        Some(s) => s.parse().map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("invalid date '{s}', expected YYYY-MM-DD"),
            )
        }),
    }
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(range): Query<ChartRange>,
) -> Result<impl IntoResponse, ApiError> {
    let (default_start, default_end) = {
        let config = state.runtime_config.read();
        (config.chart_default_start, config.chart_default_end)
    };

    let start = resolve_date(range.start.as_deref(), default_start)?;
    let end = resolve_date(range.end.as_deref(), default_end)?;

    let bars = state.bar_store.query(&symbol, start, end).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("no data for ticker '{symbol}'"),
        )
    })?;

    let rows = compute_indicators(&bars);
    info!(symbol = %symbol, bars = bars.len(), rows = rows.len(), "chart computed");

    Ok(Json(serde_json::json!({
        "data": ChartColumns::from_rows(&rows),
    })))
}

// =============================================================================
// Snapshot
// =============================================================================

async fn snapshot(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let (indices, basket) = {
        let config = state.runtime_config.read();
        (config.indices.clone(), config.basket.clone())
    };

    match build_snapshot(&state.quotes, &indices, &basket).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e @ SnapshotError::MarketClosed) | Err(e @ SnapshotError::InsufficientHistory) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(SnapshotError::Fetch(e)) => {
            warn!(error = %e, "snapshot quote fetch failed");
            state.push_error(format!("snapshot: {e}"));
            Err(api_error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(chat_client) = state.chat.as_ref() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "chat is not configured on this server",
        ));
    };

    match chat_client.ask(&req.question).await {
        Ok(answer) => Ok(Json(serde_json::json!({ "answer": answer }))),
        Err(e) => {
            warn!(error = %e, "chat proxy failed");
            state.push_error(format!("chat: {e}"));
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
