//! Shopping cart service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::cart_entry,
    repositories::{CartRepository, RecipeRepository},
};
use sea_orm::Set;

/// Cart service for business logic.
#[derive(Clone)]
pub struct CartService {
    cart_repo: CartRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(cart_repo: CartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to the user's cart.
    ///
    /// Adding a recipe already present is a conflict; the unique index
    /// backs the pre-check up under concurrent requests.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.cart_repo.exists(user_id, recipe_id).await? {
            return Err(AppError::Conflict(
                "Recipe is already in the shopping cart".to_string(),
            ));
        }

        let model = cart_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe.id),
            ..Default::default()
        };
        self.cart_repo.create(model).await?;
        Ok(())
    }

    /// Remove a recipe from the user's cart.
    ///
    /// Removing a recipe that is not present is an error.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let removed = self.cart_repo.delete_by_pair(user_id, recipe_id).await?;
        if !removed {
            return Err(AppError::NotFound(
                "Recipe is not in the shopping cart".to_string(),
            ));
        }
        Ok(())
    }

    /// Check whether a recipe is in the user's cart.
    pub async fn contains(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.cart_repo.exists(user_id, recipe_id).await
    }

    /// Recipe IDs currently in the user's cart.
    pub async fn recipe_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.cart_repo.find_recipe_ids_by_user(user_id).await
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

    #[tokio::test]
    async fn test_add_duplicate_conflict() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1")]])
                .into_connection(),
        );
        let entry = cart_entry::Model {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            recipe_id: "r1".to_string(),
            created_at: Utc::now().into(),
        };
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.add("u1", "r1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_absent_not_found() {
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.remove("u1", "r1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_missing_recipe() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );
        let cart_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );
        let result = service.add("u1", "missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }
}
