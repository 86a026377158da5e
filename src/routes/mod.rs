pub mod courses;
pub mod health;
pub mod metrics;
pub mod ratings;
pub mod recommendations;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::middleware::{rate_limit, request_id};
use crate::response::ErrorBody;
use crate::state::AppState;

/// Maximum request body size: 64 KiB.
const MAX_BODY_SIZE: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/users", users::router())
        .nest("/courses", courses::router())
        .nest("/ratings", ratings::router())
        .nest("/recommendations", recommendations::router())
        .merge(metrics::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .route("/", get(index))
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Course Recommender API",
        "endpoints": {
            "POST /api/users": "Create a new user",
            "GET /api/users/<id>": "Get user by ID",
            "DELETE /api/users/<id>": "Delete a user and all their ratings",
            "GET /api/courses": "Get all courses",
            "GET /api/courses/<id>": "Get course by ID",
            "POST /api/ratings": "Create/update a rating",
            "DELETE /api/ratings": "Delete a rating",
            "GET /api/ratings/user/<id>": "Get user ratings",
            "GET /api/recommendations/<id>": "Get recommendations for user",
            "GET /api/metrics": "Get model evaluation metrics",
            "GET /api/model": "Get current model information",
        }
    }))
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("NOT_FOUND", "Not found")),
    )
}
