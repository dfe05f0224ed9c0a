//! Friend-link handlers

use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use palaver_core::ValidationErrors;
use palaver_db::User;
use std::sync::Arc;

/// GET /v1/me/friends
pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
) -> Result<Json<Vec<User>>, ApiError> {
    session.require_read()?;
    Ok(Json(state.store.list_friends(session.user_id).await?))
}

/// PUT /v1/me/friends/{user_id} - idempotent
pub async fn add_friend(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    if user_id == session.user_id {
        let mut errors = ValidationErrors::new();
        errors.add("friend_id", "cannot befriend yourself");
        return Err(errors.into());
    }
    state.store.add_friend(session.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/me/friends/{user_id}
pub async fn remove_friend(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    state.store.remove_friend(session.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
