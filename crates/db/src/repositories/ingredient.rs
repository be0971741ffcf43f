//! Ingredient repository.

use std::sync::Arc;

use crate::entities::{Ingredient, ingredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Ingredient repository for database operations.
#[derive(Clone)]
pub struct IngredientRepository {
    db: Arc<DatabaseConnection>,
}

impl IngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an ingredient by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an ingredient by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<ingredient::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))
    }

    /// Find ingredients by a set of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<ingredient::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ingredient::find()
            .filter(ingredient::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the full catalog, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<ingredient::Model>> {
        Ingredient::find()
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find ingredients whose name starts with the query.
    pub async fn search_prefix(&self, query: &str) -> AppResult<Vec<ingredient::Model>> {
        Ingredient::find()
            .filter(ingredient::Column::Name.starts_with(query))
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find ingredients whose name contains the query anywhere.
    pub async fn search_contains(&self, query: &str) -> AppResult<Vec<ingredient::Model>> {
        Ingredient::find()
            .filter(ingredient::Column::Name.contains(query))
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an ingredient by its natural key.
    pub async fn find_by_name_and_unit(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find()
            .filter(ingredient::Column::Name.eq(name))
            .filter(ingredient::Column::MeasurementUnit.eq(measurement_unit))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new catalog ingredient.
    pub async fn create(&self, model: ingredient::ActiveModel) -> AppResult<ingredient::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count catalog entries.
    pub async fn count(&self) -> AppResult<u64> {
        Ingredient::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_ingredient(id: &str, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id: id.to_string(),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ingredient::Model>::new()])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_ordered() {
        let flour = create_test_ingredient("i1", "flour", "g");
        let sugar = create_test_ingredient("i2", "sugar", "g");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flour, sugar]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let result = repo.list().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "flour");
    }

    #[tokio::test]
    async fn test_find_by_name_and_unit() {
        let flour = create_test_ingredient("i1", "flour", "g");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flour]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let result = repo.find_by_name_and_unit("flour", "g").await.unwrap();

        assert!(result.is_some());
    }
}
