//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a recipe is in a user's favorites.
    pub async fn exists(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let found = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Insert a favorite marker.
    ///
    /// The storage-level unique index on (user, recipe) is the authoritative
    /// duplicate detector under concurrent inserts.
    pub async fn create(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Recipe is already in favorites".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Remove a favorite marker, reporting whether one was present.
    pub async fn delete_by_pair(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Recipe IDs a user has favorited, newest marker first.
    pub async fn find_recipe_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        let rows = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|m| m.recipe_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_favorite(id: &str, user_id: &str, recipe_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_true() {
        let favorite = create_test_favorite("f1", "u1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[favorite]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(repo.exists("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(!repo.exists("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        assert!(!repo.delete_by_pair("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_recipe_ids_by_user() {
        let first = create_test_favorite("f2", "u1", "r2");
        let second = create_test_favorite("f1", "u1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let ids = repo.find_recipe_ids_by_user("u1").await.unwrap();

        assert_eq!(ids, vec!["r2".to_string(), "r1".to_string()]);
    }
}
