//! Shared presentation views.

use foodgram_core::RecipeDetail;
use foodgram_db::entities::{ingredient, recipe, tag, user};
use serde::Serialize;

/// A user profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// User ID.
    pub id: String,
    /// Unique handle.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Given name, if set.
    pub first_name: Option<String>,
    /// Family name, if set.
    pub last_name: Option<String>,
    /// Whether the viewer follows this user.
    pub is_subscribed: bool,
}

impl UserView {
    /// Build from a user row and the viewer's follow state.
    pub fn from_model(user: &user::Model, is_subscribed: bool) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// A tag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    /// Tag ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hex color code.
    pub color: String,
    /// URL-safe slug.
    pub slug: String,
}

impl From<&tag::Model> for TagView {
    fn from(model: &tag::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            color: model.color.clone(),
            slug: model.slug.clone(),
        }
    }
}

/// A catalog ingredient.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientView {
    /// Ingredient ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Measurement unit.
    pub measurement_unit: String,
}

impl From<&ingredient::Model> for IngredientView {
    fn from(model: &ingredient::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            measurement_unit: model.measurement_unit.clone(),
        }
    }
}

/// An ingredient line inside a recipe view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientView {
    /// Catalog ingredient ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Measurement unit.
    pub measurement_unit: String,
    /// Amount in the measurement unit.
    pub amount: i32,
}

/// A fully hydrated recipe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    /// Recipe ID.
    pub id: String,
    /// The author profile.
    pub author: UserView,
    /// Display name.
    pub name: String,
    /// Opaque image reference.
    pub image: String,
    /// Preparation text.
    pub text: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    /// Attached tags.
    pub tags: Vec<TagView>,
    /// Ingredient lines.
    pub ingredients: Vec<RecipeIngredientView>,
    /// Whether the viewer has favorited this recipe.
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's cart.
    pub is_in_shopping_cart: bool,
}

impl RecipeView {
    /// Build from a hydrated recipe and the viewer's follow state for
    /// the author.
    pub fn from_detail(detail: &RecipeDetail, author_subscribed: bool) -> Self {
        Self {
            id: detail.recipe.id.clone(),
            author: UserView::from_model(&detail.author, author_subscribed),
            name: detail.recipe.name.clone(),
            image: detail.recipe.image.clone(),
            text: detail.recipe.text.clone(),
            cooking_time: detail.recipe.cooking_time,
            tags: detail.tags.iter().map(TagView::from).collect(),
            ingredients: detail
                .ingredients
                .iter()
                .map(|line| RecipeIngredientView {
                    id: line.ingredient.id.clone(),
                    name: line.ingredient.name.clone(),
                    measurement_unit: line.ingredient.measurement_unit.clone(),
                    amount: line.amount,
                })
                .collect(),
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_cart,
        }
    }
}

/// The compact recipe view used in membership and subscription payloads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeShortView {
    /// Recipe ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque image reference.
    pub image: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
}

impl From<&recipe::Model> for RecipeShortView {
    fn from(model: &recipe::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            image: model.image.clone(),
            cooking_time: model.cooking_time,
        }
    }
}
