//! Bearer token resolution

use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use chrono::{Duration, Utc};
use palaver_core::{digest_token, Scopes};
use palaver_db::NewToken;

/// Extract a bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Resolve a bearer token to a session.
///
/// The plaintext is digested and looked up; the store already filters out
/// expired rows. Unknown and expired tokens are indistinguishable to the
/// client.
pub async fn session_for_token(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let digest = digest_token(token);
    let (row, user) = state
        .store
        .lookup_token(&digest)
        .await?
        .ok_or(ApiError::Unauthorized("invalid or expired token"))?;

    Ok(AuthUser::from_parts(
        &user,
        Scopes::parse(&row.scopes),
        row.expires_at,
    ))
}

/// Scopes granted to tokens minted at login.
pub fn login_scopes(is_admin: bool) -> Scopes {
    if is_admin {
        Scopes::parse("read write admin")
    } else {
        Scopes::default_user()
    }
}

/// Mint a token for a user and persist its digest.
///
/// Returns the plaintext (shown exactly once) and the stored row.
pub async fn issue_token(
    state: &AppState,
    user_id: i64,
    name: &str,
    scopes: &Scopes,
    ttl_days: i64,
) -> Result<(String, palaver_db::ApiToken), ApiError> {
    let (plaintext, digest) = palaver_core::generate_token();
    let row = state
        .store
        .create_token(NewToken {
            user_id,
            name: name.to_string(),
            digest,
            scopes: scopes.to_string(),
            expires_at: Utc::now() + Duration::days(ttl_days),
        })
        .await?;
    Ok((plaintext, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic xyz"), None);
        assert_eq!(extract_bearer_token("Bearerabc"), None);
    }

    #[test]
    fn test_login_scopes() {
        assert!(login_scopes(true).is_admin());
        assert!(!login_scopes(false).is_admin());
        assert!(login_scopes(false).can_write());
    }
}
