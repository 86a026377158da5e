use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::extractors::{IdPath, JsonBody};
use crate::response::{created, message, ok, AppError};
use crate::state::AppState;
use crate::store::operations::users::{NewUser, User};
use crate::validation::{normalize_tags, validate_name, validate_time_per_week};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    name: String,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    time_per_week: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreatedUser {
    id: u64,
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub time_per_week: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            interests: user.interests,
            skills: user.skills,
            time_per_week: user.time_per_week,
            created_at: user.created_at,
        }
    }
}

async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = validate_name(&req.name).map_err(|m| AppError::bad_request("USER_INVALID_NAME", m))?;
    let interests =
        normalize_tags(&req.interests).map_err(|m| AppError::bad_request("USER_INVALID_TAGS", m))?;
    let skills =
        normalize_tags(&req.skills).map_err(|m| AppError::bad_request("USER_INVALID_TAGS", m))?;
    let time_per_week = validate_time_per_week(req.time_per_week.unwrap_or(0))
        .map_err(|m| AppError::bad_request("USER_INVALID_TIME", m))?;

    let user = state.store().create_user(NewUser {
        name,
        interests,
        skills,
        time_per_week,
    })?;
    tracing::info!(user_id = user.id, "User created");

    Ok(created(CreatedUser {
        id: user.id,
        message: "User created successfully",
    }))
}

async fn get_user(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user(user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(UserProfile::from(user)))
}

async fn delete_user(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.store().delete_user(user_id)?;
    tracing::info!(user_id, ratings_removed = removed, "User deleted");

    state.refresh_model("user_deleted").await;
    Ok(ok(message("User and all ratings deleted successfully")))
}
