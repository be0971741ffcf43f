//! Recipe repository.
//!
//! Owns the recipe row together with its ingredient lines and tag links.
//! Composition and re-composition always happen inside one transaction so
//! a partially-built recipe is never observable.

use std::sync::Arc;

use crate::entities::{Recipe, RecipeIngredient, RecipeTag, recipe, recipe_ingredient, recipe_tag};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

/// Filters for recipe listing. Absent fields leave the listing unrestricted.
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    /// Only recipes by this author.
    pub author_id: Option<String>,
    /// Only recipes carrying at least one of these tags.
    pub tag_ids: Option<Vec<String>>,
    /// Restrict to an explicit id set (resolved membership filters).
    pub recipe_ids: Option<Vec<String>>,
    /// Cap on the number of rows returned.
    pub limit: Option<u64>,
}

/// Summed amount for one ingredient across a set of recipes.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct IngredientTotal {
    /// Catalog ingredient the amounts were grouped by.
    pub ingredient_id: String,
    /// Sum of line amounts.
    pub total_amount: i64,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a recipe by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Insert a recipe together with its ingredient lines and tag links
    /// as a single atomic unit.
    ///
    /// Callers guarantee `lines` and `tag_links` are non-empty; validation
    /// happens before this point.
    pub async fn create_composed(
        &self,
        model: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
        tag_links: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::insert_many(lines)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeTag::insert_many(tag_links)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update recipe scalar fields and, where given, replace the full set
    /// of ingredient lines and/or tag links, all in one transaction.
    ///
    /// Replacement is delete-then-insert: omitting a previously present
    /// association removes it. `model` is `None` when only associations
    /// change, avoiding an UPDATE with no columns.
    pub async fn update_composed(
        &self,
        recipe_id: &str,
        model: Option<recipe::ActiveModel>,
        lines: Option<Vec<recipe_ingredient::ActiveModel>>,
        tag_links: Option<Vec<recipe_tag::ActiveModel>>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = match model {
            Some(model) => model
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?,
            None => Recipe::find_by_id(recipe_id)
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .ok_or_else(|| AppError::RecipeNotFound(recipe_id.to_string()))?,
        };

        if let Some(lines) = lines {
            RecipeIngredient::delete_many()
                .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            RecipeIngredient::insert_many(lines)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(tag_links) = tag_links {
            RecipeTag::delete_many()
                .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            RecipeTag::insert_many(tag_links)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a recipe; lines and tag links cascade at the storage layer.
    pub async fn delete_by_id(&self, id: &str) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List recipes matching the filter, newest first.
    pub async fn find_filtered(&self, filter: &RecipeFilter) -> AppResult<Vec<recipe::Model>> {
        // A resolved membership filter that matched nothing short-circuits.
        if let Some(ids) = &filter.recipe_ids
            && ids.is_empty()
        {
            return Ok(Vec::new());
        }

        let mut query = Recipe::find();

        if let Some(author_id) = &filter.author_id {
            query = query.filter(recipe::Column::AuthorId.eq(author_id));
        }

        if let Some(ids) = &filter.recipe_ids {
            query = query.filter(recipe::Column::Id.is_in(ids.iter().map(String::as_str)));
        }

        if let Some(tag_ids) = &filter.tag_ids {
            if tag_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query
                .join(JoinType::InnerJoin, recipe::Relation::TagLinks.def())
                .filter(recipe_tag::Column::TagId.is_in(tag_ids.iter().map(String::as_str)))
                .distinct();
        }

        query = query
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id);

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent recipes by an author, optionally capped.
    pub async fn find_recent_by_author(
        &self,
        author_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines for a recipe.
    pub async fn find_lines(&self, recipe_id: &str) -> AppResult<Vec<recipe_ingredient::Model>> {
        RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tag links for a recipe.
    pub async fn find_tag_links(&self, recipe_id: &str) -> AppResult<Vec<recipe_tag::Model>> {
        RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_tag::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum line amounts across a set of recipes, grouped by ingredient
    /// identity. Two catalog entries sharing a display name stay separate.
    pub async fn sum_ingredient_amounts(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<Vec<IngredientTotal>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }
        RecipeIngredient::find()
            .select_only()
            .column(recipe_ingredient::Column::IngredientId)
            .column_as(recipe_ingredient::Column::Amount.sum(), "total_amount")
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().map(String::as_str)))
            .group_by(recipe_ingredient::Column::IngredientId)
            .order_by_asc(recipe_ingredient::Column::IngredientId)
            .into_model::<IngredientTotal>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
