//! Ingredient endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use foodgram_common::AppResult;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Created},
};

use super::views::IngredientView;

/// Create the ingredients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}

/// Search query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    /// Name search text; prefix matches rank first.
    pub name: Option<String>,
}

/// Create ingredient request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

/// List or search the catalog.
async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<ApiResponse<Vec<IngredientView>>> {
    let ingredients = match params.name.as_deref() {
        Some(query) => state.ingredient_service.search(query).await?,
        None => state.ingredient_service.list().await?,
    };
    Ok(ApiResponse::ok(
        ingredients.iter().map(IngredientView::from).collect(),
    ))
}

/// Get one catalog entry.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<IngredientView>> {
    let ingredient = state.ingredient_service.get(&id).await?;
    Ok(ApiResponse::ok(IngredientView::from(&ingredient)))
}

/// Create a catalog entry.
async fn create(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateIngredientRequest>,
) -> AppResult<Created<IngredientView>> {
    let ingredient = state
        .ingredient_service
        .create(&req.name, &req.measurement_unit)
        .await?;
    Ok(Created(IngredientView::from(&ingredient)))
}
