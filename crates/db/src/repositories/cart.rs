//! Shopping cart repository.

use std::sync::Arc;

use crate::entities::{CartEntry, cart_entry};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Cart repository for database operations.
#[derive(Clone)]
pub struct CartRepository {
    db: Arc<DatabaseConnection>,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a recipe is in a user's cart.
    pub async fn exists(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let found = CartEntry::find()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .filter(cart_entry::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Insert a cart entry.
    ///
    /// The storage-level unique index on (user, recipe) is the authoritative
    /// duplicate detector under concurrent inserts.
    pub async fn create(&self, model: cart_entry::ActiveModel) -> AppResult<cart_entry::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Recipe is already in the shopping cart".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Remove a cart entry, reporting whether one was present.
    pub async fn delete_by_pair(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let result = CartEntry::delete_many()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .filter(cart_entry::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Recipe IDs currently in a user's cart, newest entry first.
    pub async fn find_recipe_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        let rows = CartEntry::find()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .order_by_desc(cart_entry::Column::CreatedAt)
            .order_by_desc(cart_entry::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|m| m.recipe_id).collect())
    }
}
