//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use foodgram_core::{
    CartService, FavoriteService, FollowService, IngredientService, RecipeService,
    ShoppingListService, TagService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// User accounts and token resolution.
    pub user_service: UserService,
    /// Recipe aggregate operations.
    pub recipe_service: RecipeService,
    /// Tag catalog.
    pub tag_service: TagService,
    /// Ingredient catalog.
    pub ingredient_service: IngredientService,
    /// Favorite membership set.
    pub favorite_service: FavoriteService,
    /// Shopping cart membership set.
    pub cart_service: CartService,
    /// Shopping list compiler.
    pub shopping_list_service: ShoppingListService,
    /// Follow graph.
    pub follow_service: FollowService,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a user and stores it in request extensions;
/// handlers decide whether authentication is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
