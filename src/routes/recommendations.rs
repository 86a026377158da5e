use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::IdPath;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(recommendations))
}

async fn recommendations(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let set = state.engine().recommend(user_id).await?;
    Ok(ok(set))
}
