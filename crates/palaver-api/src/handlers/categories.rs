//! Category handlers

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
use palaver_db::Category;
use serde::Deserialize;
use std::sync::Arc;

const SORT: SortSafelist = SortSafelist::new(&["name", "created_at"]);

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: i64,
}

fn validate(name: &str, description: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", name);
    errors.max_len("name", name, NAME_MAX);
    errors.max_len("description", description, DESCRIPTION_MAX);
    errors.into_result()
}

/// GET /v1/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Category>>, ApiError> {
    session.require_read()?;
    let spec = params.validate(&SORT)?;
    let (total, items) = state.store.list_categories(&spec).await?;
    Ok(Json(Page::new(total, &spec, items)))
}

/// GET /v1/categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    session.require_read()?;
    Ok(Json(state.store.category_by_id(id).await?))
}

/// POST /v1/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Json(body): Json<CategoryBody>,
) -> Result<Response, ApiError> {
    session.require_admin()?;
    validate(&body.name, &body.description)?;
    let category = state
        .store
        .create_category(body.name.trim(), body.description.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// PUT /v1/categories/{id}
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    session.require_admin()?;
    validate(&body.name, &body.description)?;
    let category = state
        .store
        .update_category(id, body.name.trim(), body.description.trim(), body.version)
        .await?;
    Ok(Json(category))
}

/// DELETE /v1/categories/{id}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_admin()?;
    state.store.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
