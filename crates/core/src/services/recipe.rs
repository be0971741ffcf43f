//! Recipe service.
//!
//! A recipe is composed of scalar fields plus ingredient lines and tag
//! links. Creation and update treat the whole composition as one unit:
//! non-empty associations given on update fully replace the previous
//! set, and a recipe never exists without at least one line and one tag.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag, user},
    repositories::{
        CartRepository, FavoriteRepository, IngredientRepository, RecipeFilter, RecipeRepository,
        TagRepository, UserRepository,
    },
};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Deserialize;
use std::collections::HashSet;

/// One ingredient line in a recipe payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientLineInput {
    /// Catalog ingredient ID.
    pub id: String,
    /// Amount in the ingredient's measurement unit.
    pub amount: i32,
}

/// Input for creating a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipeInput {
    /// Display name.
    pub name: String,
    /// Opaque image reference.
    pub image: String,
    /// Preparation text.
    pub text: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    /// Ingredient lines, at least one.
    pub ingredients: Vec<IngredientLineInput>,
    /// Tag IDs, at least one.
    pub tags: Vec<String>,
}

/// Input for updating a recipe. Absent fields are left unchanged; a
/// non-empty collection replaces the previous set in full, and an
/// explicit empty collection is treated the same as an absent one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipeInput {
    /// New display name.
    pub name: Option<String>,
    /// New image reference.
    pub image: Option<String>,
    /// New preparation text.
    pub text: Option<String>,
    /// New cooking time in minutes.
    pub cooking_time: Option<i32>,
    /// Replacement ingredient lines.
    pub ingredients: Option<Vec<IngredientLineInput>>,
    /// Replacement tag IDs.
    pub tags: Option<Vec<String>>,
}

/// Listing filters. Membership filters apply only when a viewer is known.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    /// Only recipes by this author.
    pub author_id: Option<String>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Option<Vec<String>>,
    /// Only recipes the viewer has favorited.
    pub only_favorited: bool,
    /// Only recipes in the viewer's cart.
    pub only_in_cart: bool,
    /// Cap on the number of recipes returned.
    pub limit: Option<u64>,
}

/// One hydrated ingredient line.
#[derive(Debug, Clone)]
pub struct IngredientLineDetail {
    /// Catalog entry.
    pub ingredient: ingredient::Model,
    /// Amount in the entry's measurement unit.
    pub amount: i32,
}

/// A recipe with its associations resolved for presentation.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    /// The recipe row.
    pub recipe: recipe::Model,
    /// The author.
    pub author: user::Model,
    /// Attached tags.
    pub tags: Vec<tag::Model>,
    /// Ingredient lines with catalog entries resolved.
    pub ingredients: Vec<IngredientLineDetail>,
    /// Whether the viewer has favorited this recipe.
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's cart.
    pub is_in_cart: bool,
}

/// Recipe service for business logic.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    user_repo: UserRepository,
    ingredient_repo: IngredientRepository,
    tag_repo: TagRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: CartRepository,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    pub fn new(
        recipe_repo: RecipeRepository,
        user_repo: UserRepository,
        ingredient_repo: IngredientRepository,
        tag_repo: TagRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: CartRepository,
    ) -> Self {
        Self {
            recipe_repo,
            user_repo,
            ingredient_repo,
            tag_repo,
            favorite_repo,
            cart_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a recipe with its lines and tag links as one atomic unit.
    pub async fn create(&self, author_id: &str, input: CreateRecipeInput) -> AppResult<RecipeDetail> {
        validate_scalars(&input.name, &input.text, input.cooking_time)?;
        validate_lines(&input.ingredients)?;
        validate_tag_ids(&input.tags)?;

        self.check_ingredients_exist(&input.ingredients).await?;
        self.check_tags_exist(&input.tags).await?;

        let recipe_id = self.id_gen.generate();
        let model = recipe::ActiveModel {
            id: Set(recipe_id.clone()),
            author_id: Set(author_id.to_string()),
            name: Set(input.name),
            image: Set(input.image),
            text: Set(input.text),
            cooking_time: Set(input.cooking_time),
            ..Default::default()
        };
        let lines = self.build_line_models(&recipe_id, &input.ingredients);
        let tag_links = self.build_tag_link_models(&recipe_id, &input.tags);

        let created = self.recipe_repo.create_composed(model, lines, tag_links).await?;
        tracing::info!(recipe_id = %created.id, author_id, "Recipe created");

        self.hydrate(created, Some(author_id)).await
    }

    /// Update a recipe. Only the author may update; non-empty association
    /// sets replace the previous ones in full, empty or absent sets leave
    /// the previous ones untouched.
    pub async fn update(
        &self,
        recipe_id: &str,
        actor_id: &str,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeDetail> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        if existing.author_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the author can modify a recipe".to_string(),
            ));
        }

        if let Some(name) = &input.name
            && name.trim().is_empty()
        {
            return Err(AppError::Validation("Recipe name must be non-empty".to_string()));
        }
        if let Some(cooking_time) = input.cooking_time
            && cooking_time < 1
        {
            return Err(AppError::Validation(
                "Cooking time must be at least one minute".to_string(),
            ));
        }
        // An explicit empty collection means "no change", same as an
        // absent field, so a recipe always keeps at least one line and
        // one tag.
        let ingredients = input.ingredients.filter(|v| !v.is_empty());
        let tags = input.tags.filter(|v| !v.is_empty());

        if let Some(lines) = &ingredients {
            validate_lines(lines)?;
            self.check_ingredients_exist(lines).await?;
        }
        if let Some(tag_ids) = &tags {
            validate_tag_ids(tag_ids)?;
            self.check_tags_exist(tag_ids).await?;
        }

        let has_scalar_changes = input.name.is_some()
            || input.image.is_some()
            || input.text.is_some()
            || input.cooking_time.is_some();
        let model = has_scalar_changes.then(|| recipe::ActiveModel {
            id: Set(recipe_id.to_string()),
            author_id: NotSet,
            name: input.name.map_or(NotSet, Set),
            image: input.image.map_or(NotSet, Set),
            text: input.text.map_or(NotSet, Set),
            cooking_time: input.cooking_time.map_or(NotSet, Set),
            created_at: NotSet,
        });
        let lines = ingredients
            .as_deref()
            .map(|lines| self.build_line_models(recipe_id, lines));
        let tag_links = tags
            .as_deref()
            .map(|tag_ids| self.build_tag_link_models(recipe_id, tag_ids));

        let updated = self
            .recipe_repo
            .update_composed(recipe_id, model, lines, tag_links)
            .await?;
        tracing::info!(recipe_id, actor_id, "Recipe updated");

        self.hydrate(updated, Some(actor_id)).await
    }

    /// Delete a recipe. Only the author may delete; associations and
    /// membership markers cascade.
    pub async fn delete(&self, recipe_id: &str, actor_id: &str) -> AppResult<()> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        if existing.author_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the author can delete a recipe".to_string(),
            ));
        }
        self.recipe_repo.delete_by_id(recipe_id).await?;
        tracing::info!(recipe_id, actor_id, "Recipe deleted");
        Ok(())
    }

    /// Get a recipe with associations resolved.
    pub async fn get(&self, recipe_id: &str, viewer_id: Option<&str>) -> AppResult<RecipeDetail> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        self.hydrate(recipe, viewer_id).await
    }

    /// List recipes matching the query, newest first.
    pub async fn list(
        &self,
        query: &RecipeListQuery,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<RecipeDetail>> {
        // Membership filters are meaningless without a viewer.
        if (query.only_favorited || query.only_in_cart) && viewer_id.is_none() {
            return Ok(Vec::new());
        }

        let tag_ids = match &query.tag_slugs {
            Some(slugs) => {
                let tags = self.tag_repo.find_by_slugs(slugs).await?;
                Some(tags.into_iter().map(|t| t.id).collect::<Vec<_>>())
            }
            None => None,
        };

        let recipe_ids = if let Some(viewer) = viewer_id {
            self.resolve_membership_ids(query, viewer).await?
        } else {
            None
        };

        let filter = RecipeFilter {
            author_id: query.author_id.clone(),
            tag_ids,
            recipe_ids,
            limit: query.limit,
        };

        let recipes = self.recipe_repo.find_filtered(&filter).await?;
        let mut details = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            details.push(self.hydrate(recipe, viewer_id).await?);
        }
        Ok(details)
    }

    /// Intersect the viewer's membership sets requested by the query.
    async fn resolve_membership_ids(
        &self,
        query: &RecipeListQuery,
        viewer_id: &str,
    ) -> AppResult<Option<Vec<String>>> {
        let mut restrict: Option<Vec<String>> = None;

        if query.only_favorited {
            restrict = Some(self.favorite_repo.find_recipe_ids_by_user(viewer_id).await?);
        }
        if query.only_in_cart {
            let cart_ids = self.cart_repo.find_recipe_ids_by_user(viewer_id).await?;
            restrict = Some(match restrict {
                Some(ids) => {
                    let cart_set: HashSet<&str> = cart_ids.iter().map(String::as_str).collect();
                    ids.into_iter().filter(|id| cart_set.contains(id.as_str())).collect()
                }
                None => cart_ids,
            });
        }

        Ok(restrict)
    }

    async fn check_ingredients_exist(&self, lines: &[IngredientLineInput]) -> AppResult<()> {
        let ids: Vec<String> = lines.iter().map(|l| l.id.clone()).collect();
        let found = self.ingredient_repo.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            let known: HashSet<&str> = found.iter().map(|m| m.id.as_str()).collect();
            let missing = ids
                .iter()
                .find(|id| !known.contains(id.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(AppError::NotFound(format!("Ingredient {missing}")));
        }
        Ok(())
    }

    async fn check_tags_exist(&self, tag_ids: &[String]) -> AppResult<()> {
        let found = self.tag_repo.find_by_ids(tag_ids).await?;
        if found.len() != tag_ids.len() {
            let known: HashSet<&str> = found.iter().map(|m| m.id.as_str()).collect();
            let missing = tag_ids
                .iter()
                .find(|id| !known.contains(id.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(AppError::NotFound(format!("Tag {missing}")));
        }
        Ok(())
    }

    fn build_line_models(
        &self,
        recipe_id: &str,
        lines: &[IngredientLineInput],
    ) -> Vec<recipe_ingredient::ActiveModel> {
        lines
            .iter()
            .map(|line| recipe_ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                ingredient_id: Set(line.id.clone()),
                amount: Set(line.amount),
            })
            .collect()
    }

    fn build_tag_link_models(&self, recipe_id: &str, tag_ids: &[String]) -> Vec<recipe_tag::ActiveModel> {
        tag_ids
            .iter()
            .map(|tag_id| recipe_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                tag_id: Set(tag_id.clone()),
            })
            .collect()
    }

    /// Resolve a recipe's associations and viewer flags.
    async fn hydrate(&self, recipe: recipe::Model, viewer_id: Option<&str>) -> AppResult<RecipeDetail> {
        let author = self.user_repo.get_by_id(&recipe.author_id).await?;

        let lines = self.recipe_repo.find_lines(&recipe.id).await?;
        let ingredient_ids: Vec<String> =
            lines.iter().map(|l| l.ingredient_id.clone()).collect();
        let catalog = self.ingredient_repo.find_by_ids(&ingredient_ids).await?;
        let mut ingredients = Vec::with_capacity(lines.len());
        for line in &lines {
            let Some(entry) = catalog.iter().find(|m| m.id == line.ingredient_id) else {
                return Err(AppError::Internal(format!(
                    "Dangling ingredient line {} on recipe {}",
                    line.id, recipe.id
                )));
            };
            ingredients.push(IngredientLineDetail {
                ingredient: entry.clone(),
                amount: line.amount,
            });
        }

        let tag_links = self.recipe_repo.find_tag_links(&recipe.id).await?;
        let tag_ids: Vec<String> = tag_links.iter().map(|l| l.tag_id.clone()).collect();
        let tags = self.tag_repo.find_by_ids(&tag_ids).await?;

        let (is_favorited, is_in_cart) = match viewer_id {
            Some(viewer) => (
                self.favorite_repo.exists(viewer, &recipe.id).await?,
                self.cart_repo.exists(viewer, &recipe.id).await?,
            ),
            None => (false, false),
        };

        Ok(RecipeDetail {
            recipe,
            author,
            tags,
            ingredients,
            is_favorited,
            is_in_cart,
        })
    }
}

fn validate_scalars(name: &str, text: &str, cooking_time: i32) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Recipe name must be non-empty".to_string()));
    }
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Recipe text must be non-empty".to_string(),
        ));
    }
    if cooking_time < 1 {
        return Err(AppError::Validation(
            "Cooking time must be at least one minute".to_string(),
        ));
    }
    Ok(())
}

fn validate_lines(lines: &[IngredientLineInput]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "A recipe needs at least one ingredient".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for line in lines {
        if line.amount < 1 {
            return Err(AppError::Validation(format!(
                "Amount for ingredient {} must be at least 1",
                line.id
            )));
        }
        if !seen.insert(line.id.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate ingredient: {}",
                line.id
            )));
        }
    }
    Ok(())
}

fn validate_tag_ids(tag_ids: &[String]) -> AppResult<()> {
    if tag_ids.is_empty() {
        return Err(AppError::Validation(
            "A recipe needs at least one tag".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for id in tag_ids {
        if !seen.insert(id.as_str()) {
            return Err(AppError::Validation(format!("Duplicate tag: {id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn empty_conn() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn build_service(recipe_db: Arc<sea_orm::DatabaseConnection>) -> RecipeService {
        RecipeService::new(
            RecipeRepository::new(recipe_db),
            UserRepository::new(empty_conn()),
            IngredientRepository::new(empty_conn()),
            TagRepository::new(empty_conn()),
            FavoriteRepository::new(empty_conn()),
            CartRepository::new(empty_conn()),
        )
    }

    fn create_test_recipe(id: &str, author_id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: "Omelette".to_string(),
            image: "recipes/omelette.png".to_string(),
            text: "Beat and fry.".to_string(),
            cooking_time: 10,
            created_at: Utc::now().into(),
        }
    }

    fn valid_input() -> CreateRecipeInput {
        CreateRecipeInput {
            name: "Omelette".to_string(),
            image: "recipes/omelette.png".to_string(),
            text: "Beat and fry.".to_string(),
            cooking_time: 10,
            ingredients: vec![IngredientLineInput {
                id: "i1".to_string(),
                amount: 3,
            }],
            tags: vec!["t1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_rejects_zero_cooking_time() {
        let service = build_service(empty_conn());
        let mut input = valid_input();
        input.cooking_time = 0;

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_ingredients() {
        let service = build_service(empty_conn());
        let mut input = valid_input();
        input.ingredients.clear();

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_ingredient() {
        let service = build_service(empty_conn());
        let mut input = valid_input();
        input.ingredients.push(IngredientLineInput {
            id: "i1".to_string(),
            amount: 1,
        });

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_zero_amount() {
        let service = build_service(empty_conn());
        let mut input = valid_input();
        input.ingredients[0].amount = 0;

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_forbidden() {
        let recipe = create_test_recipe("r1", "u1");
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe]])
                .into_connection(),
        );

        let service = build_service(recipe_db);
        let result = service
            .update("r1", "u2", UpdateRecipeInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_empty_collections_mean_no_change() {
        let recipe = create_test_recipe("r1", "u1");
        // get_by_id, the fetch inside the update transaction, then the
        // association reads during hydration. No delete or insert is
        // expected, so no exec results are provided.
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_query_results([[recipe]])
                .append_query_results([Vec::<recipe_ingredient::Model>::new()])
                .append_query_results([Vec::<recipe_tag::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user::Model {
                    id: "u1".to_string(),
                    username: "chef".to_string(),
                    email: "chef@example.com".to_string(),
                    first_name: None,
                    last_name: None,
                    token: None,
                    created_at: Utc::now().into(),
                }]])
                .into_connection(),
        );
        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<foodgram_db::entities::favorite::Model>::new()])
                .into_connection(),
        );
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<foodgram_db::entities::cart_entry::Model>::new()])
                .into_connection(),
        );

        let service = RecipeService::new(
            RecipeRepository::new(recipe_db),
            UserRepository::new(user_db),
            IngredientRepository::new(empty_conn()),
            TagRepository::new(empty_conn()),
            FavoriteRepository::new(favorite_db),
            CartRepository::new(cart_db),
        );
        let input = UpdateRecipeInput {
            ingredients: Some(Vec::new()),
            tags: Some(Vec::new()),
            ..UpdateRecipeInput::default()
        };
        let detail = service.update("r1", "u1", input).await.unwrap();

        assert_eq!(detail.recipe.name, "Omelette");
    }

    #[tokio::test]
    async fn test_delete_missing_recipe() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let service = build_service(recipe_db);
        let result = service.delete("missing", "u1").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_membership_filter_without_viewer() {
        let service = build_service(empty_conn());
        let query = RecipeListQuery {
            only_favorited: true,
            ..RecipeListQuery::default()
        };

        let result = service.list(&query, None).await.unwrap();
        assert!(result.is_empty());
    }
}
