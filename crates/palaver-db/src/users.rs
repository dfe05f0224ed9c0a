//! User persistence

use crate::{DbError, Store, User};
use chrono::Utc;
use palaver_core::paging::PageSpec;
use sqlx::QueryBuilder;

/// Fields for a new user row.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial update for a user. `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl Store {
    /// Insert a user. The first row in an empty table is promoted to admin
    /// inside the INSERT, so two racing registrations cannot both win.
    pub async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, name, password_hash, is_admin, created_at, updated_at) \
             VALUES (?, ?, ?, ? OR NOT EXISTS (SELECT 1 FROM users), ?, ?)",
        )
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password_hash)
        .bind(new.is_admin)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "user", "email"))?;

        self.user_by_id(result.last_insert_rowid()).await
    }

    pub async fn user_by_id(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("user"))
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?)
    }

    /// List users, optionally filtered by a substring match on name or email.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        spec: &PageSpec,
    ) -> Result<(i64, Vec<User>), DbError> {
        let pattern = search.map(|s| format!("%{s}%"));

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
        if let Some(pattern) = &pattern {
            count.push(" WHERE name LIKE ").push_bind(pattern);
            count.push(" OR email LIKE ").push_bind(pattern);
        }
        let total: i64 = count.build_query_scalar().fetch_one(self.pool()).await?;

        let mut query = QueryBuilder::new("SELECT * FROM users");
        if let Some(pattern) = &pattern {
            query.push(" WHERE name LIKE ").push_bind(pattern);
            query.push(" OR email LIKE ").push_bind(pattern);
        }
        query.push(spec.to_sql());
        let users = query.build_query_as::<User>().fetch_all(self.pool()).await?;

        Ok((total, users))
    }

    /// Versioned update. Zero rows affected on an existing user is a
    /// [`DbError::VersionConflict`].
    pub async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
        version: i64,
    ) -> Result<User, DbError> {
        let current = self.user_by_id(id).await?;
        let result = sqlx::query(
            "UPDATE users SET email = ?, name = ?, password_hash = ?, updated_at = ?, \
             version = version + 1 WHERE id = ? AND version = ?",
        )
        .bind(changes.email.as_ref().unwrap_or(&current.email))
        .bind(changes.name.as_ref().unwrap_or(&current.name))
        .bind(changes.password_hash.as_ref().unwrap_or(&current.password_hash))
        .bind(Utc::now())
        .bind(id)
        .bind(version)
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "user", "email"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::VersionConflict("user"));
        }
        self.user_by_id(id).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("user"));
        }
        Ok(())
    }
}
