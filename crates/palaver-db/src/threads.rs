//! Thread persistence, including tag attachments

use crate::{DbError, Store, Tag, Thread};
use chrono::Utc;
use palaver_core::paging::PageSpec;
use sqlx::QueryBuilder;

/// Optional filters for thread listings.
#[derive(Clone, Debug, Default)]
pub struct ThreadFilter {
    pub category_id: Option<i64>,
    /// Tag name; threads must carry it.
    pub tag: Option<String>,
}

/// Partial update for a thread. `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct ThreadChanges {
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub locked: Option<bool>,
}

impl Store {
    pub async fn create_thread(
        &self,
        category_id: i64,
        user_id: i64,
        title: &str,
    ) -> Result<Thread, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO threads (category_id, user_id, title, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(category_id)
        .bind(user_id)
        .bind(title)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.thread_by_id(result.last_insert_rowid()).await
    }

    pub async fn thread_by_id(&self, id: i64) -> Result<Thread, DbError> {
        sqlx::query_as::<_, Thread>("SELECT * FROM threads WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("thread"))
    }

    pub async fn list_threads(
        &self,
        filter: &ThreadFilter,
        spec: &PageSpec,
    ) -> Result<(i64, Vec<Thread>), DbError> {
        fn push_filter(query: &mut QueryBuilder<'_, sqlx::Sqlite>, filter: &ThreadFilter) {
            let mut sep = " WHERE ";
            if let Some(category_id) = filter.category_id {
                query.push(sep).push("threads.category_id = ").push_bind(category_id);
                sep = " AND ";
            }
            if let Some(tag) = &filter.tag {
                query
                    .push(sep)
                    .push(
                        "threads.id IN (SELECT thread_id FROM thread_tags \
                         JOIN tags ON tags.id = thread_tags.tag_id WHERE tags.name = ",
                    )
                    .push_bind(tag.clone())
                    .push(")");
            }
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM threads");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool()).await?;

        let mut query = QueryBuilder::new("SELECT * FROM threads");
        push_filter(&mut query, filter);
        query.push(spec.to_sql());
        let threads = query.build_query_as::<Thread>().fetch_all(self.pool()).await?;

        Ok((total, threads))
    }

    pub async fn update_thread(
        &self,
        id: i64,
        changes: ThreadChanges,
        version: i64,
    ) -> Result<Thread, DbError> {
        let current = self.thread_by_id(id).await?;
        let result = sqlx::query(
            "UPDATE threads SET title = ?, category_id = ?, locked = ?, updated_at = ?, \
             version = version + 1 WHERE id = ? AND version = ?",
        )
        .bind(changes.title.as_ref().unwrap_or(&current.title))
        .bind(changes.category_id.unwrap_or(current.category_id))
        .bind(changes.locked.unwrap_or(current.locked))
        .bind(Utc::now())
        .bind(id)
        .bind(version)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::VersionConflict("thread"));
        }
        self.thread_by_id(id).await
    }

    pub async fn delete_thread(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("thread"));
        }
        Ok(())
    }

    pub async fn thread_tags(&self, thread_id: i64) -> Result<Vec<Tag>, DbError> {
        Ok(sqlx::query_as::<_, Tag>(
            "SELECT tags.* FROM tags JOIN thread_tags ON thread_tags.tag_id = tags.id \
             WHERE thread_tags.thread_id = ? ORDER BY tags.name",
        )
        .bind(thread_id)
        .fetch_all(self.pool())
        .await?)
    }

    /// Attach a tag to a thread. Idempotent.
    pub async fn attach_tag(&self, thread_id: i64, tag_id: i64) -> Result<(), DbError> {
        self.thread_by_id(thread_id).await?;
        self.tag_by_id(tag_id).await?;
        sqlx::query("INSERT OR IGNORE INTO thread_tags (thread_id, tag_id) VALUES (?, ?)")
            .bind(thread_id)
            .bind(tag_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn detach_tag(&self, thread_id: i64, tag_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM thread_tags WHERE thread_id = ? AND tag_id = ?")
            .bind(thread_id)
            .bind(tag_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("tag attachment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_category, seed_thread, seed_user, store};
    use palaver_core::paging::{PageParams, SortSafelist};

    const SAFELIST: SortSafelist = SortSafelist::new(&["created_at", "title", "updated_at"]);

    fn default_spec() -> PageSpec {
        PageParams::default().validate(&SAFELIST).unwrap()
    }

    #[tokio::test]
    async fn test_filter_by_category() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let general = seed_category(&store, "general").await;
        let meta = seed_category(&store, "meta").await;
        seed_thread(&store, &general, &user, "a").await;
        seed_thread(&store, &general, &user, "b").await;
        seed_thread(&store, &meta, &user, "c").await;

        let filter = ThreadFilter {
            category_id: Some(general.id),
            ..Default::default()
        };
        let (total, threads) = store.list_threads(&filter, &default_spec()).await.unwrap();
        assert_eq!(total, 2);
        assert!(threads.iter().all(|t| t.category_id == general.id));
    }

    #[tokio::test]
    async fn test_filter_by_tag() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let tagged = seed_thread(&store, &category, &user, "tagged").await;
        seed_thread(&store, &category, &user, "untagged").await;
        let tag = store.create_tag("rust").await.unwrap();
        store.attach_tag(tagged.id, tag.id).await.unwrap();

        let filter = ThreadFilter {
            tag: Some("rust".to_string()),
            ..Default::default()
        };
        let (total, threads) = store.list_threads(&filter, &default_spec()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(threads[0].id, tagged.id);

        let filter = ThreadFilter {
            category_id: Some(category.id),
            tag: Some("rust".to_string()),
        };
        let (total, _) = store.list_threads(&filter, &default_spec()).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_versioned_update_and_lock() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;

        let changes = ThreadChanges {
            locked: Some(true),
            ..Default::default()
        };
        let updated = store.update_thread(thread.id, changes.clone(), thread.version).await.unwrap();
        assert!(updated.locked);
        assert_eq!(updated.version, 2);

        let err = store.update_thread(thread.id, changes, thread.version).await.unwrap_err();
        assert!(matches!(err, DbError::VersionConflict("thread")));
    }

    #[tokio::test]
    async fn test_tag_attach_detach() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;
        let tag = store.create_tag("rust").await.unwrap();

        store.attach_tag(thread.id, tag.id).await.unwrap();
        // Attaching twice is a no-op.
        store.attach_tag(thread.id, tag.id).await.unwrap();
        assert_eq!(store.thread_tags(thread.id).await.unwrap().len(), 1);

        store.detach_tag(thread.id, tag.id).await.unwrap();
        assert!(matches!(
            store.detach_tag(thread.id, tag.id).await.unwrap_err(),
            DbError::NotFound("tag attachment")
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_posts() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;
        let post = store.create_post(thread.id, user.id, "first").await.unwrap();

        store.delete_thread(thread.id).await.unwrap();
        assert!(matches!(
            store.post_by_id(post.id).await.unwrap_err(),
            DbError::NotFound("post")
        ));
    }
}
