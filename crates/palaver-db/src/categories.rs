//! Category persistence

use crate::{Category, DbError, Store};
use chrono::Utc;
use palaver_core::paging::PageSpec;

impl Store {
    pub async fn create_category(&self, name: &str, description: &str) -> Result<Category, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "category", "name"))?;

        self.category_by_id(result.last_insert_rowid()).await
    }

    pub async fn category_by_id(&self, id: i64) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("category"))
    }

    pub async fn list_categories(&self, spec: &PageSpec) -> Result<(i64, Vec<Category>), DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(self.pool())
            .await?;
        let sql = format!("SELECT * FROM categories{}", spec.to_sql());
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.pool())
            .await?;
        Ok((total, categories))
    }

    pub async fn update_category(
        &self,
        id: i64,
        name: &str,
        description: &str,
        version: i64,
    ) -> Result<Category, DbError> {
        self.category_by_id(id).await?;
        let result = sqlx::query(
            "UPDATE categories SET name = ?, description = ?, updated_at = ?, \
             version = version + 1 WHERE id = ? AND version = ?",
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .bind(version)
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "category", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::VersionConflict("category"));
        }
        self.category_by_id(id).await
    }

    /// Delete a category. Rejected while threads still reference it, so the
    /// client gets a clear conflict instead of a bare FK error. The check and
    /// the delete share a transaction so no thread can slip in between.
    pub async fn delete_category(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool().begin().await?;
        let threads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threads WHERE category_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if threads > 0 {
            return Err(DbError::Referenced {
                resource: "category",
                dependents: "threads",
            });
        }
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("category"));
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_category, seed_thread, seed_user, store};
    use palaver_core::paging::{Direction, PageParams, SortSafelist};

    const SAFELIST: SortSafelist = SortSafelist::new(&["name", "created_at"]);

    #[tokio::test]
    async fn test_create_update_conflict() {
        let store = store().await;
        let category = seed_category(&store, "general").await;
        assert_eq!(category.version, 1);

        let updated = store
            .update_category(category.id, "general", "catch-all", category.version)
            .await
            .unwrap();
        assert_eq!(updated.description, "catch-all");
        assert_eq!(updated.version, 2);

        let err = store
            .update_category(category.id, "general", "again", category.version)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VersionConflict("category")));
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let store = store().await;
        seed_category(&store, "general").await;
        let err = store.create_category("general", "").await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { field: "name", .. }));
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = store().await;
        seed_category(&store, "beta").await;
        seed_category(&store, "alpha").await;

        let params = PageParams {
            sort: Some("name".to_string()),
            direction: Some(Direction::Desc),
            ..Default::default()
        };
        let spec = params.validate(&SAFELIST).unwrap();
        let (total, categories) = store.list_categories(&spec).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(categories[0].name, "beta");
        assert_eq!(categories[1].name, "alpha");
    }

    #[tokio::test]
    async fn test_delete_with_threads_rejected() {
        let store = store().await;
        let user = seed_user(&store, "alice@example.com").await;
        let category = seed_category(&store, "general").await;
        let thread = seed_thread(&store, &category, &user, "hello").await;

        let err = store.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, DbError::Referenced { resource: "category", .. }));

        store.delete_thread(thread.id).await.unwrap();
        store.delete_category(category.id).await.unwrap();
        assert!(matches!(
            store.category_by_id(category.id).await.unwrap_err(),
            DbError::NotFound("category")
        ));
        assert!(matches!(
            store.delete_category(category.id).await.unwrap_err(),
            DbError::NotFound("category")
        ));
    }
}
