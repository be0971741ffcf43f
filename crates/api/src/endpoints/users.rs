//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use foodgram_common::AppResult;
use foodgram_core::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Created, no_content},
};

use super::views::{RecipeShortView, UserView};

/// Create the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/me", get(me))
        .route("/subscriptions", get(subscriptions))
        .route("/{id}", get(show))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Registration response, the only place the API token is revealed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredView {
    /// The created profile.
    #[serde(flatten)]
    pub user: UserView,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// A followed author with their recipes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    /// The followed author.
    #[serde(flatten)]
    pub author: UserView,
    /// Total recipes the author has published.
    pub recipes_count: u64,
    /// The author's most recent recipes.
    pub recipes: Vec<RecipeShortView>,
}

/// Subscription listing parameters.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionParams {
    /// Cap on recipes embedded per author.
    pub recipes_limit: Option<u64>,
}

/// Register a user.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Created<RegisteredView>> {
    let input = CreateUserInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
    };
    let user = state.user_service.create(input).await?;
    let token = user.token.clone().unwrap_or_default();
    Ok(Created(RegisteredView {
        user: UserView::from_model(&user, false),
        token,
    }))
}

/// Get the authenticated user's own profile.
async fn me(
    AuthUser(user): AuthUser,
    State(_state): State<AppState>,
) -> AppResult<ApiResponse<UserView>> {
    Ok(ApiResponse::ok(UserView::from_model(&user, false)))
}

/// Get a user profile.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserView>> {
    let user = state.user_service.get(&id).await?;
    let is_subscribed = match &viewer {
        Some(v) if v.id != user.id => state.follow_service.is_following(&v.id, &user.id).await?,
        _ => false,
    };
    Ok(ApiResponse::ok(UserView::from_model(&user, is_subscribed)))
}

/// List the authors the viewer follows, with their recipes.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubscriptionParams>,
) -> AppResult<ApiResponse<Vec<SubscriptionView>>> {
    let subs = state
        .follow_service
        .list_following(&user.id, params.recipes_limit)
        .await?;

    let views = subs
        .iter()
        .map(|sub| SubscriptionView {
            author: UserView::from_model(&sub.author, true),
            recipes_count: sub.recipes_count,
            recipes: sub.recipes.iter().map(RecipeShortView::from).collect(),
        })
        .collect();
    Ok(ApiResponse::ok(views))
}

/// Follow an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Created<SubscriptionView>> {
    state.follow_service.follow(&user.id, &id).await?;
    let sub = state.follow_service.subscription(&id, None).await?;

    Ok(Created(SubscriptionView {
        author: UserView::from_model(&sub.author, true),
        recipes_count: sub.recipes_count,
        recipes: sub.recipes.iter().map(RecipeShortView::from).collect(),
    }))
}

/// Unfollow an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.follow_service.unfollow(&user.id, &id).await?;
    Ok(no_content())
}
