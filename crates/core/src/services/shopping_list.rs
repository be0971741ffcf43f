//! Shopping list compiler.
//!
//! Aggregates the ingredient lines of every recipe in a user's cart into
//! one purchase list, summing amounts per catalog ingredient, and renders
//! it as a downloadable text document.

use chrono::Utc;
use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::user,
    repositories::{CartRepository, IngredientRepository, RecipeRepository},
};
use std::fmt::Write as _;

/// One aggregated purchase position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    /// Catalog ingredient ID.
    pub ingredient_id: String,
    /// Ingredient name.
    pub name: String,
    /// Measurement unit.
    pub measurement_unit: String,
    /// Summed amount across all cart recipes.
    pub total_amount: i64,
}

/// Shopping list service for business logic.
#[derive(Clone)]
pub struct ShoppingListService {
    cart_repo: CartRepository,
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
}

impl ShoppingListService {
    /// Create a new shopping list service.
    #[must_use]
    pub const fn new(
        cart_repo: CartRepository,
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
    ) -> Self {
        Self {
            cart_repo,
            recipe_repo,
            ingredient_repo,
        }
    }

    /// Compile the user's cart into aggregated purchase positions.
    ///
    /// Amounts are summed per catalog ingredient; two entries sharing a
    /// display name stay separate positions. The result is sorted by
    /// ingredient name, then id, so repeated runs over the same cart
    /// produce identical output.
    pub async fn compile(&self, user_id: &str) -> AppResult<Vec<ShoppingListItem>> {
        let recipe_ids = self.cart_repo.find_recipe_ids_by_user(user_id).await?;
        if recipe_ids.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let totals = self.recipe_repo.sum_ingredient_amounts(&recipe_ids).await?;
        let ingredient_ids: Vec<String> =
            totals.iter().map(|t| t.ingredient_id.clone()).collect();
        let catalog = self.ingredient_repo.find_by_ids(&ingredient_ids).await?;

        let mut items = Vec::with_capacity(totals.len());
        for total in totals {
            let Some(entry) = catalog.iter().find(|m| m.id == total.ingredient_id) else {
                return Err(AppError::Internal(format!(
                    "Aggregated amount for unknown ingredient {}",
                    total.ingredient_id
                )));
            };
            items.push(ShoppingListItem {
                ingredient_id: total.ingredient_id,
                name: entry.name.clone(),
                measurement_unit: entry.measurement_unit.clone(),
                total_amount: total.total_amount,
            });
        }

        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.ingredient_id.cmp(&b.ingredient_id)));
        Ok(items)
    }

    /// Render aggregated positions as the downloadable text document.
    #[must_use]
    pub fn render(user: &user::Model, items: &[ShoppingListItem]) -> String {
        let mut out = format!(
            "Shopping list for: {}\n{}\n\n",
            user.username,
            Utc::now().format("%d/%m/%Y")
        );
        for item in items {
            let _ = writeln!(
                out,
                " {}, {} - {}",
                title_case(&item.name),
                item.measurement_unit,
                item.total_amount
            );
        }
        out
    }

    /// Attachment filename for a user's shopping list.
    #[must_use]
    pub fn filename(user: &user::Model) -> String {
        format!("{}_shopping_list.txt", user.username)
    }
}

/// Uppercase the first letter of each whitespace-separated word.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc as ChronoUtc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(username: &str) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            token: None,
            created_at: ChronoUtc::now().into(),
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("olive oil"), "Olive Oil");
        assert_eq!(title_case("salt"), "Salt");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_render_format() {
        let user = create_test_user("alice");
        let items = vec![
            ShoppingListItem {
                ingredient_id: "i1".to_string(),
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 300,
            },
            ShoppingListItem {
                ingredient_id: "i2".to_string(),
                name: "olive oil".to_string(),
                measurement_unit: "ml".to_string(),
                total_amount: 50,
            },
        ];

        let text = ShoppingListService::render(&user, &items);

        assert!(text.starts_with("Shopping list for: alice\n"));
        assert!(text.contains(" Flour, g - 300\n"));
        assert!(text.contains(" Olive Oil, ml - 50\n"));
    }

    #[test]
    fn test_filename() {
        let user = create_test_user("alice");
        assert_eq!(
            ShoppingListService::filename(&user),
            "alice_shopping_list.txt"
        );
    }

    #[tokio::test]
    async fn test_compile_empty_cart() {
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<foodgram_db::entities::cart_entry::Model>::new()])
                .into_connection(),
        );
        let other1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let other2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ShoppingListService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(other1),
            IngredientRepository::new(other2),
        );
        let result = service.compile("u1").await;

        assert!(matches!(result, Err(AppError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_compile_sorted_by_name_then_id() {
        let entry = foodgram_db::entities::cart_entry::Model {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            recipe_id: "r1".to_string(),
            created_at: ChronoUtc::now().into(),
        };
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "ingredient_id" => sea_orm::Value::from("i1"),
                        "total_amount" => sea_orm::Value::from(300i64),
                    },
                    btreemap! {
                        "ingredient_id" => sea_orm::Value::from("i2"),
                        "total_amount" => sea_orm::Value::from(50i64),
                    },
                ]])
                .into_connection(),
        );
        let flour = foodgram_db::entities::ingredient::Model {
            id: "i1".to_string(),
            name: "flour".to_string(),
            measurement_unit: "g".to_string(),
        };
        let oil = foodgram_db::entities::ingredient::Model {
            id: "i2".to_string(),
            name: "olive oil".to_string(),
            measurement_unit: "ml".to_string(),
        };
        let ingredient_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flour, oil]])
                .into_connection(),
        );

        let service = ShoppingListService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
            IngredientRepository::new(ingredient_db),
        );
        let items = service.compile("u1").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "flour");
        assert_eq!(items[0].total_amount, 300);
        assert_eq!(items[1].name, "olive oil");
    }
}
