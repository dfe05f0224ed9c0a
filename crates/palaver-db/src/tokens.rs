//! API token persistence and lookup

use crate::{ApiToken, DbError, Store, User};
use chrono::{DateTime, Utc};

/// Fields for a new token row. The digest is produced by the caller; the
/// plaintext never reaches this crate.
#[derive(Clone, Debug)]
pub struct NewToken {
    pub user_id: i64,
    pub name: String,
    pub digest: String,
    pub scopes: String,
    pub expires_at: DateTime<Utc>,
}

impl Store {
    pub async fn create_token(&self, new: NewToken) -> Result<ApiToken, DbError> {
        let result = sqlx::query(
            "INSERT INTO tokens (user_id, name, digest, scopes, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.digest)
        .bind(&new.scopes)
        .bind(new.expires_at)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "token", "digest"))?;

        self.token_by_id(result.last_insert_rowid()).await
    }

    pub async fn token_by_id(&self, id: i64) -> Result<ApiToken, DbError> {
        sqlx::query_as::<_, ApiToken>("SELECT * FROM tokens WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("token"))
    }

    /// Resolve a token digest to its row and owning user, rejecting expired
    /// tokens at the SQL level.
    pub async fn lookup_token(&self, digest: &str) -> Result<Option<(ApiToken, User)>, DbError> {
        let token = sqlx::query_as::<_, ApiToken>(
            "SELECT * FROM tokens WHERE digest = ? AND expires_at > ?",
        )
        .bind(digest)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?;

        match token {
            Some(token) => {
                let user = self.user_by_id(token.user_id).await?;
                Ok(Some((token, user)))
            }
            None => Ok(None),
        }
    }

    pub async fn list_tokens(&self, user_id: i64) -> Result<Vec<ApiToken>, DbError> {
        Ok(sqlx::query_as::<_, ApiToken>(
            "SELECT * FROM tokens WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?)
    }

    /// Revoke one of `user_id`'s tokens. Tokens belonging to other users are
    /// indistinguishable from missing ones.
    pub async fn delete_token(&self, user_id: i64, token_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM tokens WHERE id = ? AND user_id = ?")
            .bind(token_id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("token"));
        }
        Ok(())
    }

    /// Drop expired tokens. Called from a background task.
    pub async fn delete_expired_tokens(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
