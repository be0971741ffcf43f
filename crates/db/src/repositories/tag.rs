//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a tag by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// Find tags by a set of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Tag::find()
            .filter(tag::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find tags by a set of slugs.
    pub async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<tag::Model>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        Tag::find()
            .filter(tag::Column::Slug.is_in(slugs.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all tags, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tag.
    ///
    /// Tag names and slugs are unique; a duplicate surfaces as a conflict.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Tag name or slug already exists".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: &str, name: &str, slug: &str) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            color: "#FF0000".to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slugs() {
        let breakfast = create_test_tag("t1", "Breakfast", "breakfast");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[breakfast]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo
            .find_by_slugs(&["breakfast".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].slug, "breakfast");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_shortcut() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = TagRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
