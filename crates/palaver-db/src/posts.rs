//! Post persistence

use crate::{DbError, Post, Store};
use chrono::Utc;
use palaver_core::paging::PageSpec;

impl Store {
    pub async fn create_post(&self, thread_id: i64, user_id: i64, body: &str) -> Result<Post, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO posts (thread_id, user_id, body, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(thread_id)
        .bind(user_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.post_by_id(result.last_insert_rowid()).await
    }

    pub async fn post_by_id(&self, id: i64) -> Result<Post, DbError> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("post"))
    }

    pub async fn list_posts(
        &self,
        thread_id: i64,
        spec: &PageSpec,
    ) -> Result<(i64, Vec<Post>), DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_one(self.pool())
            .await?;
        let sql = format!("SELECT * FROM posts WHERE thread_id = ?{}", spec.to_sql());
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(thread_id)
            .fetch_all(self.pool())
            .await?;
        Ok((total, posts))
    }

    pub async fn update_post(&self, id: i64, body: &str, version: i64) -> Result<Post, DbError> {
        self.post_by_id(id).await?;
        let result = sqlx::query(
            "UPDATE posts SET body = ?, updated_at = ?, version = version + 1 \
             WHERE id = ? AND version = ?",
        )
        .bind(body)
        .bind(Utc::now())
        .bind(id)
        .bind(version)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::VersionConflict("post"));
        }
        self.post_by_id(id).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("post"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_category, seed_post, seed_thread, seed_user, store};
    use palaver_core::paging::{PageParams, SortSafelist};

    const SAFELIST: SortSafelist = SortSafelist::new(&["created_at"]);

    fn spec(limit: i64, offset: i64) -> PageSpec {
        PageParams {
            limit: Some(limit),
            offset: Some(offset),
            ..Default::default()
        }
        .validate(&SAFELIST)
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;
        for i in 0..5 {
            seed_post(&store, &thread, &user, &format!("post {i}")).await;
        }

        let (total, page) = store.list_posts(thread.id, &spec(2, 0)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].body, "post 0");

        let (_, page) = store.list_posts(thread.id, &spec(2, 4)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].body, "post 4");
    }

    #[tokio::test]
    async fn test_versioned_update() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;
        let post = seed_post(&store, &thread, &user, "draft").await;

        let updated = store.update_post(post.id, "final", post.version).await.unwrap();
        assert_eq!(updated.body, "final");
        assert_eq!(updated.version, 2);

        assert!(matches!(
            store.update_post(post.id, "stale", post.version).await.unwrap_err(),
            DbError::VersionConflict("post")
        ));
        assert!(matches!(
            store.update_post(9999, "x", 1).await.unwrap_err(),
            DbError::NotFound("post")
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;
        let post = seed_post(&store, &thread, &user, "bye").await;

        store.delete_post(post.id).await.unwrap();
        assert!(matches!(
            store.delete_post(post.id).await.unwrap_err(),
            DbError::NotFound("post")
        ));
    }
}
