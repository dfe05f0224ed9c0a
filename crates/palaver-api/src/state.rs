//! Application state and request sessions

use crate::config::ServerConfig;
use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use palaver_core::Scopes;
use palaver_db::{NewUser, Store, User};
use tracing::{info, warn};

/// Email of the synthetic user backing no-auth development sessions.
pub const DEV_USER_EMAIL: &str = "dev@localhost";

/// Application state shared across handlers.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Forum database
    pub store: Store,
    /// Row id of the development user, present when auth is disabled
    pub dev_user_id: Option<i64>,
}

impl AppState {
    /// Connect the store, run migrations, and (when auth is disabled) make
    /// sure a development user exists so writes have a valid author.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&config.database_url).await?;

        let dev_user_id = if config.auth_enabled {
            None
        } else {
            warn!("authentication is DISABLED - for development only!");
            Some(Self::ensure_dev_user(&store).await?)
        };

        Ok(Self {
            config,
            store,
            dev_user_id,
        })
    }

    /// State over an already-connected store; used by tests.
    pub async fn with_store(config: ServerConfig, store: Store) -> anyhow::Result<Self> {
        let dev_user_id = if config.auth_enabled {
            None
        } else {
            Some(Self::ensure_dev_user(&store).await?)
        };
        Ok(Self {
            config,
            store,
            dev_user_id,
        })
    }

    async fn ensure_dev_user(store: &Store) -> anyhow::Result<i64> {
        if let Some(user) = store.user_by_email(DEV_USER_EMAIL).await? {
            return Ok(user.id);
        }
        let user = store
            .create_user(NewUser {
                email: DEV_USER_EMAIL.to_string(),
                name: "Development User".to_string(),
                // Never a valid bcrypt hash, so the dev user cannot log in.
                password_hash: "!".to_string(),
                is_admin: true,
            })
            .await?;
        info!(id = user.id, "created development user");
        Ok(user.id)
    }
}

/// Authenticated caller, inserted into request extensions by the auth
/// middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub name: String,
    pub is_admin: bool,
    pub scopes: Scopes,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    /// Build a session from a token row and its owner.
    pub fn from_parts(user: &User, scopes: Scopes, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            is_admin: user.is_admin,
            scopes,
            expires_at,
        }
    }

    /// All-scope session used when authentication is disabled.
    pub fn dev(user_id: i64) -> Self {
        Self {
            user_id,
            name: "Development User".to_string(),
            is_admin: true,
            scopes: Scopes::all(),
            expires_at: Utc::now() + Duration::days(365),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn require_read(&self) -> Result<(), ApiError> {
        if self.scopes.can_read() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("read scope required"))
        }
    }

    pub fn require_write(&self) -> Result<(), ApiError> {
        if self.scopes.can_write() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("write scope required"))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin || self.scopes.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin access required"))
        }
    }

    /// Owners may act on their own resources; admins on anything.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            self.require_admin()
                .map_err(|_| ApiError::Forbidden("not the owner"))
        }
    }
}
