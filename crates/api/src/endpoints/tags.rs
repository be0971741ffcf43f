//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use foodgram_common::AppResult;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Created},
};

use super::views::TagView;

/// Create the tags router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}

/// Create tag request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
    pub slug: Option<String>,
}

/// List all tags.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagView>>> {
    let tags = state.tag_service.list().await?;
    Ok(ApiResponse::ok(tags.iter().map(TagView::from).collect()))
}

/// Get one tag.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TagView>> {
    let tag = state.tag_service.get(&id).await?;
    Ok(ApiResponse::ok(TagView::from(&tag)))
}

/// Create a tag.
async fn create(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> AppResult<Created<TagView>> {
    let tag = state
        .tag_service
        .create(&req.name, req.color.as_deref(), req.slug.as_deref())
        .await?;
    Ok(Created(TagView::from(&tag)))
}
