//! Post reaction handlers

use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use palaver_core::ValidationErrors;
use palaver_db::ReactionCount;
use serde::Serialize;
use std::sync::Arc;

const EMOJI_MAX: usize = 64;

/// Reaction tallies plus the caller's own reactions.
#[derive(Debug, Serialize)]
pub struct ReactionsView {
    pub counts: Vec<ReactionCount>,
    pub mine: Vec<String>,
}

fn validate_emoji(emoji: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("emoji", emoji);
    errors.max_len("emoji", emoji, EMOJI_MAX);
    errors.into_result()
}

/// GET /v1/posts/{id}/reactions
pub async fn get_reactions(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(post_id): Path<i64>,
) -> Result<Json<ReactionsView>, ApiError> {
    session.require_read()?;
    state.store.post_by_id(post_id).await?;
    let counts = state.store.reaction_counts(post_id).await?;
    let mine = state.store.user_reactions(post_id, session.user_id).await?;
    Ok(Json(ReactionsView { counts, mine }))
}

/// PUT /v1/posts/{id}/reactions/{emoji} - idempotent
pub async fn add_reaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path((post_id, emoji)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    validate_emoji(&emoji)?;
    state.store.post_by_id(post_id).await?;
    state.store.add_reaction(post_id, session.user_id, &emoji).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/posts/{id}/reactions/{emoji}
pub async fn remove_reaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path((post_id, emoji)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    state
        .store
        .remove_reaction(post_id, session.user_id, &emoji)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
