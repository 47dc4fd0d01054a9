use axum::{extract::State, http::StatusCode, routing::any, Json, Router};
use serde::Serialize;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

/// Uptime-probe router.
///
/// Every path and method answers `200 OK`; `/health` additionally reports
/// uptime as JSON.
pub fn router() -> Router {
    let state = AppState {
        started_at: Instant::now(),
    };

    Router::new()
        .route("/health", any(health))
        .fallback(ok)
        .with_state(state)
}

async fn ok() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_report(&state))
}

fn health_report(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    }
}
