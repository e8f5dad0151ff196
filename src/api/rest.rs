// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Scoring either runs against a
// session (which owns the previous score used for the delta) or as a
// stateless preview.
//
// CORS is configured permissively; the dashboard front-end is served from a
// different origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::alerts::AlertThresholds;
use crate::app_state::AppState;
use crate::market_data::{derive_signals, SeriesInputs};
use crate::signals::SignalConfig;
use crate::types::{Levels, MacroReadings, Signals};

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
        .route("/api/v1/config", get(config))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/v1/sessions/:id/score", post(score_session))
        .route("/api/v1/score", post(score_preview))
        .route("/api/v1/signals/derive", post(derive))
        .layer(cors)
        .with_state(state)
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn session_not_found(id: &Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": format!("Unknown session '{id}'"),
        })),
    )
}

// =============================================================================
// Health & config
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    uptime_secs: u64,
    sessions: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.sessions.len(),
    })
}

#[derive(Serialize)]
struct ConfigResponse<'a> {
    signals: &'a [SignalConfig],
    alert_thresholds: &'a AlertThresholds,
    session_idle_timeout_secs: u64,
}

async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = serde_json::to_value(ConfigResponse {
        signals: &state.config.signals,
        alert_thresholds: &state.alert_thresholds,
        session_idle_timeout_secs: state.config.session_idle_timeout_secs,
    })
    .unwrap_or_default();
    Json(body)
}

// =============================================================================
// Sessions
// =============================================================================

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let info = state.sessions.create();
    state.increment_version();
    info!(session_id = %info.session_id, "session opened via API");
    (StatusCode::CREATED, Json(info))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .sessions
        .get(&id)
        .map(Json)
        .ok_or_else(|| session_not_found(&id))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.remove(&id) {
        return Err(session_not_found(&id));
    }
    state.increment_version();
    info!(session_id = %id, "session closed via API");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Scoring
// =============================================================================

#[derive(Deserialize)]
struct ScoreRequest {
    #[serde(default)]
    signals: Signals,
    #[serde(default, rename = "macro")]
    macro_readings: MacroReadings,
    #[serde(default)]
    levels: Levels,
}

async fn score_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = state
        .score_session(&id, &req.signals, &req.macro_readings, req.levels)
        .ok_or_else(|| {
            warn!(session_id = %id, "score requested for unknown session");
            session_not_found(&id)
        })?;

    info!(
        session_id = %id,
        score = ?resp.report.score,
        delta = ?resp.report.delta,
        alerts = resp.alerts.len(),
        "session scored"
    );
    Ok(Json(resp))
}

async fn score_preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> impl IntoResponse {
    Json(state.score_preview(&req.signals, &req.macro_readings, req.levels))
}

// =============================================================================
// Signal derivation
// =============================================================================

async fn derive(Json(inputs): Json<SeriesInputs>) -> impl IntoResponse {
    Json(derive_signals(&inputs))
}

// =============================================================================
// Tests
// =============================================================================
