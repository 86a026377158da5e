use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::extractors::IdPath;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/:id", get(get_course))
}

async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().list_courses()?))
}

async fn get_course(
    State(state): State<AppState>,
    IdPath(course_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let course = state
        .store()
        .get_course(course_id)?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    Ok(ok(course))
}
