use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store().ratings_revision().is_ok();
    let model = state.engine().current_model().await;
    let status = if store_healthy { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "uptime_secs": state.uptime_secs(),
        "store": { "healthy": store_healthy },
        "model": {
            "trained": model.is_some(),
            "revision": model.as_ref().map(|m| m.revision),
        },
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once migrations have seeded a catalog.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.store().count_courses() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let healthy = state.store().get_user(0).is_ok();
    let latency_us = start.elapsed().as_micros() as u64;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "healthy": healthy,
            "latency_us": latency_us,
            "users": state.store().count_users(),
            "courses": state.store().count_courses(),
            "ratings": state.store().count_ratings(),
        })),
    )
}
