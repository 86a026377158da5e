use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::extractors::{IdPath, JsonBody};
use crate::response::{message, ok, AppError};
use crate::state::AppState;
use crate::store::operations::ratings::{Rating, RatingWrite};
use crate::validation::validate_rating;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(save_rating).delete(delete_rating))
        .route("/user/:id", get(user_ratings))
}

#[derive(Debug, Deserialize)]
struct SaveRatingRequest {
    user_id: u64,
    course_id: u64,
    rating: f64,
}

#[derive(Debug, Deserialize)]
struct DeleteRatingRequest {
    user_id: u64,
    course_id: u64,
}

#[derive(Debug, Serialize)]
struct RatingEntry {
    course_id: u64,
    rating: u8,
}

impl From<Rating> for RatingEntry {
    fn from(r: Rating) -> Self {
        Self {
            course_id: r.course_id,
            rating: r.score,
        }
    }
}

async fn save_rating(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SaveRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let score =
        validate_rating(req.rating).map_err(|m| AppError::bad_request("RATING_INVALID_SCORE", m))?;

    let store = state.store();
    if !store.user_exists(req.user_id)? {
        return Err(AppError::not_found("User not found"));
    }
    if !store.course_exists(req.course_id)? {
        return Err(AppError::not_found("Course not found"));
    }

    let write = store.upsert_rating(req.user_id, req.course_id, score)?;
    tracing::info!(
        user_id = req.user_id,
        course_id = req.course_id,
        score,
        write = ?write,
        "Rating saved"
    );

    state.refresh_model("rating_saved").await;

    let status = match write {
        RatingWrite::Created => StatusCode::CREATED,
        RatingWrite::Updated => StatusCode::OK,
    };
    Ok((status, Json(message("Rating saved successfully"))))
}

async fn delete_rating(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DeleteRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().delete_rating(req.user_id, req.course_id)? {
        return Err(AppError::not_found("Rating not found"));
    }
    tracing::info!(user_id = req.user_id, course_id = req.course_id, "Rating deleted");

    state.refresh_model("rating_deleted").await;
    Ok(ok(message("Rating deleted successfully")))
}

async fn user_ratings(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let entries: Vec<RatingEntry> = state
        .store()
        .ratings_for_user(user_id)?
        .into_iter()
        .map(RatingEntry::from)
        .collect();
    Ok(ok(entries))
}
