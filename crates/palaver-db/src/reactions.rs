//! Post reactions

use crate::{DbError, ReactionCount, Store};
use chrono::Utc;

impl Store {
    /// Per-emoji tallies for a post, alphabetical by emoji.
    pub async fn reaction_counts(&self, post_id: i64) -> Result<Vec<ReactionCount>, DbError> {
        Ok(sqlx::query_as::<_, ReactionCount>(
            "SELECT emoji, COUNT(*) AS count FROM reactions WHERE post_id = ? \
             GROUP BY emoji ORDER BY emoji",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await?)
    }

    /// Emojis the given user has put on the post.
    pub async fn user_reactions(&self, post_id: i64, user_id: i64) -> Result<Vec<String>, DbError> {
        Ok(sqlx::query_scalar(
            "SELECT emoji FROM reactions WHERE post_id = ? AND user_id = ? ORDER BY emoji",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_all(self.pool())
        .await?)
    }

    /// Add a reaction. Idempotent per (post, user, emoji); returns whether a
    /// row was actually inserted.
    pub async fn add_reaction(
        &self,
        post_id: i64,
        user_id: i64,
        emoji: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO reactions (post_id, user_id, emoji, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(emoji)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_reaction(
        &self,
        post_id: i64,
        user_id: i64,
        emoji: &str,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM reactions WHERE post_id = ? AND user_id = ? AND emoji = ?",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(emoji)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("reaction"));
        }
        Ok(())
    }
}
