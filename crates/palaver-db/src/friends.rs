//! Friend links between users

use crate::{DbError, Store, User};
use chrono::Utc;

impl Store {
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<User>, DbError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT users.* FROM users JOIN friends ON friends.friend_id = users.id \
             WHERE friends.user_id = ? ORDER BY users.name",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?)
    }

    /// Add a friend link. Idempotent; the target must exist.
    pub async fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<(), DbError> {
        self.user_by_id(friend_id).await?;
        sqlx::query("INSERT OR IGNORE INTO friends (user_id, friend_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .bind(Utc::now())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM friends WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("friend"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_user, store};

    #[tokio::test]
    async fn test_add_list_remove() {
        let store = store().await;
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;

        store.add_friend(alice.id, bob.id).await.unwrap();
        // Idempotent.
        store.add_friend(alice.id, bob.id).await.unwrap();

        let friends = store.list_friends(alice.id).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, bob.id);
        // Friendship is directional.
        assert!(store.list_friends(bob.id).await.unwrap().is_empty());

        store.remove_friend(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            store.remove_friend(alice.id, bob.id).await.unwrap_err(),
            DbError::NotFound("friend")
        ));
    }

    #[tokio::test]
    async fn test_add_missing_target() {
        let store = store().await;
        let alice = seed_user(&store, "alice@example.com").await;
        assert!(matches!(
            store.add_friend(alice.id, 999).await.unwrap_err(),
            DbError::NotFound("user")
        ));
    }

    #[tokio::test]
    async fn test_cascade_on_user_delete() {
        let store = store().await;
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        store.add_friend(alice.id, bob.id).await.unwrap();

        store.delete_user(bob.id).await.unwrap();
        assert!(store.list_friends(alice.id).await.unwrap().is_empty());
    }
}
