//! API error type and JSON response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use palaver_core::ValidationErrors;
use palaver_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to API clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, malformed, expired or unknown credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Authenticated but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    /// Stale version, duplicate value, or state that forbids the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Field-level validation failures.
    #[error("invalid request: {0}")]
    Validation(ValidationErrors),

    #[error("rate limited")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Db(DbError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}

/// JSON error body: `{"error", "message", "fields"?}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

impl ApiError {
    fn parts(self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "unauthorized",
                    message: Some(msg.to_string()),
                    fields: None,
                },
            ),
            Self::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: "forbidden",
                    message: Some(msg.to_string()),
                    fields: None,
                },
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message: Some(msg),
                    fields: None,
                },
            ),
            Self::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "conflict",
                    message: Some(msg),
                    fields: None,
                },
            ),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: "invalid_request",
                    message: None,
                    fields: Some(errors),
                },
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    error: "rate_limited",
                    message: Some("please reduce your request rate".to_string()),
                    fields: None,
                },
            ),
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal_error",
                        message: Some("an internal error occurred".to_string()),
                        fields: None,
                    },
                )
            }
            Self::Db(err) => match err {
                DbError::NotFound(resource) => (
                    StatusCode::NOT_FOUND,
                    ErrorBody {
                        error: "not_found",
                        message: Some(format!("{resource} not found")),
                        fields: None,
                    },
                ),
                DbError::VersionConflict(resource) => (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: "version_conflict",
                        message: Some(format!("{resource} was modified concurrently")),
                        fields: None,
                    },
                ),
                DbError::Duplicate { resource, field } => (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: "conflict",
                        message: Some(format!("{resource} with this {field} already exists")),
                        fields: None,
                    },
                ),
                DbError::Referenced { resource, dependents } => (
                    StatusCode::CONFLICT,
                    ErrorBody {
                        error: "conflict",
                        message: Some(format!("{resource} still has {dependents}")),
                        fields: None,
                    },
                ),
                DbError::Sqlx(err) => {
                    tracing::error!(error = %err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody {
                            error: "database_error",
                            message: Some("a database error occurred".to_string()),
                            fields: None,
                        },
                    )
                }
                DbError::Migrate(err) => {
                    tracing::error!(error = %err, "migration error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody {
                            error: "database_error",
                            message: Some("a database error occurred".to_string()),
                            fields: None,
                        },
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("no token").parts().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Db(DbError::VersionConflict("post")).parts().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Db(DbError::NotFound("thread")).parts().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::RateLimited.parts().0, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_validation_body_carries_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "must not be empty");
        let (status, body) = ApiError::Validation(errors).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "invalid_request");
        assert!(body.fields.is_some());
    }
}
