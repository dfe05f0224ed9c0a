//! Tag persistence

use crate::{DbError, Store, Tag};
use chrono::Utc;
use palaver_core::paging::PageSpec;

impl Store {
    pub async fn create_tag(&self, name: &str) -> Result<Tag, DbError> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO tags (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(|e| DbError::on_unique(e, "tag", "name"))?;

        self.tag_by_id(result.last_insert_rowid()).await
    }

    pub async fn tag_by_id(&self, id: i64) -> Result<Tag, DbError> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(DbError::NotFound("tag"))
    }

    pub async fn list_tags(&self, spec: &PageSpec) -> Result<(i64, Vec<Tag>), DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(self.pool())
            .await?;
        let sql = format!("SELECT * FROM tags{}", spec.to_sql());
        let tags = sqlx::query_as::<_, Tag>(&sql).fetch_all(self.pool()).await?;
        Ok((total, tags))
    }

    pub async fn update_tag(&self, id: i64, name: &str, version: i64) -> Result<Tag, DbError> {
        self.tag_by_id(id).await?;
        let result = sqlx::query(
            "UPDATE tags SET name = ?, updated_at = ?, version = version + 1 \
             WHERE id = ? AND version = ?",
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .bind(version)
        .execute(self.pool())
        .await
        .map_err(|e| DbError::on_unique(e, "tag", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::VersionConflict("tag"));
        }
        self.tag_by_id(id).await
    }

    /// Delete a tag. Thread attachments go with it (FK cascade).
    pub async fn delete_tag(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("tag"));
        }
        Ok(())
    }
}
