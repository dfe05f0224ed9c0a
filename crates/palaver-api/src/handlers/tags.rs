//! Tag handlers

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
use palaver_db::Tag;
use serde::Deserialize;
use std::sync::Arc;

const SORT: SortSafelist = SortSafelist::new(&["name", "created_at"]);

const NAME_MAX: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TagBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TagUpdate {
    pub name: String,
    pub version: i64,
}

fn validate_name(name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", name);
    errors.max_len("name", name, NAME_MAX);
    errors.into_result()
}

/// GET /v1/tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Tag>>, ApiError> {
    session.require_read()?;
    let spec = params.validate(&SORT)?;
    let (total, items) = state.store.list_tags(&spec).await?;
    Ok(Json(Page::new(total, &spec, items)))
}

/// GET /v1/tags/{id}
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, ApiError> {
    session.require_read()?;
    Ok(Json(state.store.tag_by_id(id).await?))
}

/// POST /v1/tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Json(body): Json<TagBody>,
) -> Result<Response, ApiError> {
    session.require_admin()?;
    validate_name(&body.name)?;
    let tag = state.store.create_tag(body.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(tag)).into_response())
}

/// PUT /v1/tags/{id}
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<TagUpdate>,
) -> Result<Json<Tag>, ApiError> {
    session.require_admin()?;
    validate_name(&body.name)?;
    let tag = state.store.update_tag(id, body.name.trim(), body.version).await?;
    Ok(Json(tag))
}

/// DELETE /v1/tags/{id}
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_admin()?;
    state.store.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
