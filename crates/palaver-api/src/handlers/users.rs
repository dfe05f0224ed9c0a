//! User handlers: registration, login, profile management

use crate::auth::{issue_token, login_scopes};
use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use palaver_core::paging::{Direction, Page, PageParams, SortSafelist};
use palaver_core::ValidationErrors;
use palaver_db::{NewUser, User, UserChanges};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SORT: SortSafelist = SortSafelist::new(&["created_at", "name", "email"]);

const NAME_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub version: i64,
}

/// Query parameters for user listings. No `#[serde(flatten)]`: flattened
/// numeric fields do not survive urlencoded deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<Direction>,
}

async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    // A malformed stored hash reads as a failed login, not a 500.
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}

fn validate_password(errors: &mut ValidationErrors, password: &str) {
    errors.min_len("password", password, PASSWORD_MIN);
    errors.max_len("password", password, PASSWORD_MAX);
}

/// POST /v1/users - public registration
///
/// The first registered user becomes the admin.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterUser>,
) -> Result<Response, ApiError> {
    let mut errors = ValidationErrors::new();
    errors.email("email", &body.email);
    errors.require("name", &body.name);
    errors.max_len("name", &body.name, NAME_MAX);
    validate_password(&mut errors, &body.password);
    errors.into_result()?;

    let password_hash = hash_password(body.password, state.config.bcrypt_cost).await?;
    // The admin bootstrap happens inside the insert itself.
    let user = state
        .store
        .create_user(NewUser {
            email: body.email.trim().to_string(),
            name: body.name.trim().to_string(),
            password_hash,
            is_admin: false,
        })
        .await?;

    tracing::info!(id = user.id, admin = user.is_admin, "user registered");
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// POST /v1/login - public, issues a fresh bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.store.user_by_email(body.email.trim()).await?;

    // Same rejection whether the account or the password is wrong.
    let user = match user {
        Some(user) => user,
        None => return Err(ApiError::Unauthorized("invalid credentials")),
    };
    if !verify_password(body.password, user.password_hash.clone()).await? {
        return Err(ApiError::Unauthorized("invalid credentials"));
    }

    let scopes = login_scopes(user.is_admin);
    let (token, row) = issue_token(
        &state,
        user.id,
        "login",
        &scopes,
        state.config.token_ttl_days,
    )
    .await?;

    Ok(Json(LoginResponse {
        token,
        expires_at: row.expires_at,
        user,
    }))
}

/// GET /v1/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.store.user_by_id(session.user_id).await?))
}

/// GET /v1/users - admin only
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Page<User>>, ApiError> {
    session.require_admin()?;
    let page = PageParams {
        limit: params.limit,
        offset: params.offset,
        sort: params.sort.clone(),
        direction: params.direction,
    };
    let spec = page.validate(&SORT)?;
    let (total, items) = state.store.list_users(params.search.as_deref(), &spec).await?;
    Ok(Json(Page::new(total, &spec, items)))
}

/// GET /v1/users/{id} - self or admin
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    session.require_owner_or_admin(id)?;
    Ok(Json(state.store.user_by_id(id).await?))
}

/// PUT /v1/users/{id} - self or admin, versioned
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    session.require_write()?;
    session.require_owner_or_admin(id)?;

    let mut errors = ValidationErrors::new();
    if let Some(email) = &body.email {
        errors.email("email", email);
    }
    if let Some(name) = &body.name {
        errors.require("name", name);
        errors.max_len("name", name, NAME_MAX);
    }
    if let Some(password) = &body.password {
        validate_password(&mut errors, password);
    }
    errors.into_result()?;

    let password_hash = match body.password {
        Some(password) => Some(hash_password(password, state.config.bcrypt_cost).await?),
        None => None,
    };
    let changes = UserChanges {
        email: body.email.map(|e| e.trim().to_string()),
        name: body.name.map(|n| n.trim().to_string()),
        password_hash,
    };
    let user = state.store.update_user(id, changes, body.version).await?;
    Ok(Json(user))
}

/// DELETE /v1/users/{id} - self or admin
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    session.require_write()?;
    session.require_owner_or_admin(id)?;
    state.store.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
