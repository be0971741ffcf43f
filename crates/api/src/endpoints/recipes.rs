//! Recipe endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use foodgram_common::AppResult;
use foodgram_core::{
    CreateRecipeInput, IngredientLineInput, RecipeDetail, RecipeListQuery, ShoppingListService,
    UpdateRecipeInput,
};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Created, no_content},
};

use super::views::{RecipeShortView, RecipeView};

/// Create the recipes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route("/{id}", get(show).patch(update).delete(remove))
        .route("/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route("/{id}/shopping_cart", post(add_to_cart).delete(remove_from_cart))
}

/// One ingredient line in a recipe payload.
#[derive(Debug, Deserialize)]
pub struct IngredientLineRequest {
    /// Catalog ingredient ID.
    pub id: String,
    /// Amount in the ingredient's measurement unit.
    pub amount: i32,
}

/// Create recipe request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientLineRequest>,
    pub tags: Vec<String>,
}

/// Update recipe request. Absent fields stay unchanged; present
/// collections replace the previous set.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientLineRequest>>,
    pub tags: Option<Vec<String>>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListRecipesParams {
    /// Only recipes by this author.
    pub author: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    /// Only recipes the viewer has favorited.
    pub is_favorited: Option<u8>,
    /// Only recipes in the viewer's cart.
    pub is_in_shopping_cart: Option<u8>,
    /// Cap on the number of recipes returned.
    pub limit: Option<u64>,
}

fn lines_to_input(lines: Vec<IngredientLineRequest>) -> Vec<IngredientLineInput> {
    lines
        .into_iter()
        .map(|l| IngredientLineInput {
            id: l.id,
            amount: l.amount,
        })
        .collect()
}

async fn to_view(
    state: &AppState,
    viewer_id: Option<&str>,
    detail: &RecipeDetail,
) -> AppResult<RecipeView> {
    let author_subscribed = match viewer_id {
        Some(viewer) if viewer != detail.author.id => {
            state
                .follow_service
                .is_following(viewer, &detail.author.id)
                .await?
        }
        _ => false,
    };
    Ok(RecipeView::from_detail(detail, author_subscribed))
}

/// List recipes, newest first.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> AppResult<ApiResponse<Vec<RecipeView>>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());

    let query = RecipeListQuery {
        author_id: params.author,
        tag_slugs: params.tags.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }),
        only_favorited: params.is_favorited == Some(1),
        only_in_cart: params.is_in_shopping_cart == Some(1),
        limit: params.limit,
    };

    let details = state.recipe_service.list(&query, viewer_id).await?;
    let mut views = Vec::with_capacity(details.len());
    for detail in &details {
        views.push(to_view(&state, viewer_id, detail).await?);
    }
    Ok(ApiResponse::ok(views))
}

/// Create a recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateRecipeRequest>,
) -> AppResult<Created<RecipeView>> {
    let input = CreateRecipeInput {
        name: req.name,
        image: req.image,
        text: req.text,
        cooking_time: req.cooking_time,
        ingredients: lines_to_input(req.ingredients),
        tags: req.tags,
    };

    let detail = state.recipe_service.create(&user.id, input).await?;
    let view = to_view(&state, Some(&user.id), &detail).await?;
    Ok(Created(view))
}

/// Get one recipe.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeView>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let detail = state.recipe_service.get(&id, viewer_id).await?;
    let view = to_view(&state, viewer_id, &detail).await?;
    Ok(ApiResponse::ok(view))
}

/// Update a recipe (author only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecipeRequest>,
) -> AppResult<ApiResponse<RecipeView>> {
    let input = UpdateRecipeInput {
        name: req.name,
        image: req.image,
        text: req.text,
        cooking_time: req.cooking_time,
        ingredients: req.ingredients.map(lines_to_input),
        tags: req.tags,
    };

    let detail = state.recipe_service.update(&id, &user.id, input).await?;
    let view = to_view(&state, Some(&user.id), &detail).await?;
    Ok(ApiResponse::ok(view))
}

/// Delete a recipe (author only).
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.recipe_service.delete(&id, &user.id).await?;
    Ok(no_content())
}

/// Add a recipe to favorites.
async fn add_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Created<RecipeShortView>> {
    state.favorite_service.add(&user.id, &id).await?;
    let detail = state.recipe_service.get(&id, Some(&user.id)).await?;
    Ok(Created(RecipeShortView::from(&detail.recipe)))
}

/// Remove a recipe from favorites.
async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

/// Add a recipe to the shopping cart.
async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Created<RecipeShortView>> {
    state.cart_service.add(&user.id, &id).await?;
    let detail = state.recipe_service.get(&id, Some(&user.id)).await?;
    Ok(Created(RecipeShortView::from(&detail.recipe)))
}

/// Remove a recipe from the shopping cart.
async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.cart_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

/// Download the aggregated shopping list as a text attachment.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let items = state.shopping_list_service.compile(&user.id).await?;
    let body = ShoppingListService::render(&user, &items);
    let filename = ShoppingListService::filename(&user);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
