//! Thread handlers, including tag attachments

use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use palaver_core::paging::{Direction, Page, PageParams, SortSafelist};
use palaver_core::ValidationErrors;
use palaver_db::{DbError, Tag, Thread, ThreadChanges, ThreadFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SORT: SortSafelist = SortSafelist::new(&["created_at", "updated_at", "title"]);

const TITLE_MAX: usize = 200;

/// Query parameters for thread listings.
///
/// Spelled out rather than `#[serde(flatten)]`-ing [`PageParams`]: flattened
/// numeric fields do not survive urlencoded deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadListParams {
    pub category_id: Option<i64>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<Direction>,
}

impl ThreadListParams {
    fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.clone(),
            direction: self.direction,
        }
    }
}

/// Thread plus its attached tags.
#[derive(Debug, Serialize)]
pub struct ThreadView {
    #[serde(flatten)]
    pub thread: Thread,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
pub struct CreateThread {
    pub category_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThread {
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub locked: Option<bool>,
    pub version: i64,
}

/// Map a missing category to a field error on `category_id`.
async fn check_category(state: &AppState, category_id: i64) -> Result<(), ApiError> {
    match state.store.category_by_id(category_id).await {
        Ok(_) => Ok(()),
        Err(DbError::NotFound(_)) => {
            let mut errors = ValidationErrors::new();
            errors.add("category_id", "does not exist");
            Err(errors.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /v1/threads
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Query(params): Query<ThreadListParams>,
) -> Result<Json<Page<Thread>>, ApiError> {
    session.require_read()?;
    let spec = params.page().validate(&SORT)?;
    let filter = ThreadFilter {
        category_id: params.category_id,
        tag: params.tag.clone(),
    };
    let (total, items) = state.store.list_threads(&filter, &spec).await?;
    Ok(Json(Page::new(total, &spec, items)))
}

/// GET /v1/threads/{id}
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ThreadView>, ApiError> {
    session.require_read()?;
    let thread = state.store.thread_by_id(id).await?;
    let tags = state.store.thread_tags(id).await?;
    Ok(Json(ThreadView { thread, tags }))
}

/// POST /v1/threads
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Json(body): Json<CreateThread>,
) -> Result<Response, ApiError> {
    session.require_write()?;

    let mut errors = ValidationErrors::new();
    errors.require("title", &body.title);
    errors.max_len("title", &body.title, TITLE_MAX);
    errors.into_result()?;
    check_category(&state, body.category_id).await?;

    let thread = state
        .store
        .create_thread(body.category_id, session.user_id, body.title.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(thread)).into_response())
}

/// PUT /v1/threads/{id}
pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateThread>,
) -> Result<Json<Thread>, ApiError> {
    session.require_write()?;
    let thread = state.store.thread_by_id(id).await?;
    session.require_owner_or_admin(thread.user_id)?;

    let mut errors = ValidationErrors::new();
    if let Some(title) = &body.title {
        errors.require("title", title);
        errors.max_len("title", title, TITLE_MAX);
    }
    errors.into_result()?;
    if let Some(category_id) = body.category_id {
        check_category(&state, category_id).await?;
    }

    let changes = ThreadChanges {
        title: body.title.as_ref().map(|t| t.trim().to_string()),
        category_id: body.category_id,
        locked: body.locked,
    };
    let thread = state.store.update_thread(id, changes, body.version).await?;
    Ok(Json(thread))
}

/// DELETE /v1/threads/{id}
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    let thread = state.store.thread_by_id(id).await?;
    session.require_owner_or_admin(thread.user_id)?;
    state.store.delete_thread(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/threads/{id}/tags/{tag_id}
pub async fn attach_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path((id, tag_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    let thread = state.store.thread_by_id(id).await?;
    session.require_owner_or_admin(thread.user_id)?;
    state.store.attach_tag(id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/threads/{id}/tags/{tag_id}
pub async fn detach_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path((id, tag_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    let thread = state.store.thread_by_id(id).await?;
    session.require_owner_or_admin(thread.user_id)?;
    state.store.detach_tag(id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
