//! API token handlers

use crate::auth::issue_token;
use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use palaver_core::{Scopes, ValidationErrors};
use palaver_db::ApiToken;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const NAME_MAX: usize = 100;
const TTL_DAYS_MAX: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct CreateToken {
    pub name: String,
    pub scopes: Option<String>,
    pub ttl_days: Option<i64>,
}

/// Creation response: the only place the plaintext ever appears.
#[derive(Debug, Serialize)]
pub struct TokenCreated {
    pub token: String,
    #[serde(flatten)]
    pub info: ApiToken,
}

/// GET /v1/me/tokens
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
) -> Result<Json<Vec<ApiToken>>, ApiError> {
    Ok(Json(state.store.list_tokens(session.user_id).await?))
}

/// POST /v1/me/tokens
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Json(body): Json<CreateToken>,
) -> Result<Response, ApiError> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &body.name);
    errors.max_len("name", &body.name, NAME_MAX);

    let ttl_days = body.ttl_days.unwrap_or(state.config.token_ttl_days);
    if !(1..=TTL_DAYS_MAX).contains(&ttl_days) {
        errors.add("ttl_days", format!("must be between 1 and {TTL_DAYS_MAX}"));
    }

    let scopes = match &body.scopes {
        Some(raw) => {
            let requested = Scopes::parse(raw);
            if requested.is_empty() {
                errors.add("scopes", "must not be empty");
            } else if !session.scopes.covers(&requested) {
                errors.add("scopes", "exceed the caller's scopes");
            }
            requested
        }
        None => session.scopes.clone(),
    };
    errors.into_result()?;

    let (token, info) = issue_token(
        &state,
        session.user_id,
        body.name.trim(),
        &scopes,
        ttl_days,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TokenCreated { token, info })).into_response())
}

/// DELETE /v1/me/tokens/{id}
pub async fn delete_token(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_token(session.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
