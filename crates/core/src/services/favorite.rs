//! Favorite service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::favorite,
    repositories::{FavoriteRepository, RecipeRepository},
};
use sea_orm::Set;

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub fn new(favorite_repo: FavoriteRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to the user's favorites.
    ///
    /// Adding a recipe already present is a conflict; the unique index
    /// backs the pre-check up under concurrent requests.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.favorite_repo.exists(user_id, recipe_id).await? {
            return Err(AppError::Conflict(
                "Recipe is already in favorites".to_string(),
            ));
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe.id),
            ..Default::default()
        };
        self.favorite_repo.create(model).await?;
        Ok(())
    }

    /// Remove a recipe from the user's favorites.
    ///
    /// Removing a recipe that is not present is an error.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let removed = self.favorite_repo.delete_by_pair(user_id, recipe_id).await?;
        if !removed {
            return Err(AppError::NotFound(
                "Recipe is not in favorites".to_string(),
            ));
        }
        Ok(())
    }

    /// Check whether a recipe is in the user's favorites.
    pub async fn contains(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.favorite_repo.exists(user_id, recipe_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::recipe;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_recipe(id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: "u9".to_string(),
            name: "Omelette".to_string(),
            image: "recipes/omelette.png".to_string(),
            text: "Beat and fry.".to_string(),
            cooking_time: 10,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_favorite(id: &str, user_id: &str, recipe_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_add_missing_recipe() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );
        let favorite_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.add("u1", "missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_duplicate_conflict() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1")]])
                .into_connection(),
        );
        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_favorite("f1", "u1", "r1")]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.add("u1", "r1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_absent_not_found() {
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.remove("u1", "r1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
