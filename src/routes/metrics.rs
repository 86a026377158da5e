use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::response::{ok, AppError};
use crate::state::AppState;

/// Merged into `/api`: `/metrics` and `/model`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/model", get(model_info))
}

/// Held-out RMSE and Precision@k for the current ratings.
async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let evaluation = state.engine().evaluate().await?;
    Ok(ok(evaluation))
}

async fn model_info(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().model_info().await?))
}
