//! Post handlers

use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use palaver_core::paging::{Page, PageParams, SortSafelist};
use palaver_core::ValidationErrors;
use palaver_db::Post;
use serde::Deserialize;
use std::sync::Arc;

const SORT: SortSafelist = SortSafelist::new(&["created_at"]);

const BODY_MAX: usize = 65_536;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePost {
    pub body: String,
    pub version: i64,
}

fn validate_body(body: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("body", body);
    errors.max_len("body", body, BODY_MAX);
    errors.into_result()
}

/// GET /v1/threads/{id}/posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(thread_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Post>>, ApiError> {
    session.require_read()?;
    let spec = params.validate(&SORT)?;
    state.store.thread_by_id(thread_id).await?;
    let (total, items) = state.store.list_posts(thread_id, &spec).await?;
    Ok(Json(Page::new(total, &spec, items)))
}

/// GET /v1/posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    session.require_read()?;
    Ok(Json(state.store.post_by_id(id).await?))
}

/// POST /v1/threads/{id}/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(thread_id): Path<i64>,
    Json(body): Json<CreatePost>,
) -> Result<Response, ApiError> {
    session.require_write()?;
    validate_body(&body.body)?;

    let thread = state.store.thread_by_id(thread_id).await?;
    if thread.locked {
        return Err(ApiError::Conflict("thread is locked".to_string()));
    }

    let post = state
        .store
        .create_post(thread_id, session.user_id, &body.body)
        .await?;
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// PUT /v1/posts/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePost>,
) -> Result<Json<Post>, ApiError> {
    session.require_write()?;
    let post = state.store.post_by_id(id).await?;
    session.require_owner_or_admin(post.user_id)?;
    validate_body(&body.body)?;

    let thread = state.store.thread_by_id(post.thread_id).await?;
    if thread.locked {
        return Err(ApiError::Conflict("thread is locked".to_string()));
    }

    let post = state.store.update_post(id, &body.body, body.version).await?;
    Ok(Json(post))
}

/// DELETE /v1/posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    let post = state.store.post_by_id(id).await?;
    session.require_owner_or_admin(post.user_id)?;
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
