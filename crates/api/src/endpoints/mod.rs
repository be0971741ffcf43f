//! API endpoints.

mod ingredients;
mod recipes;
mod tags;
mod users;
mod views;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/recipes", recipes::router())
        .nest("/tags", tags::router())
        .nest("/ingredients", ingredients::router())
        .nest("/users", users::router())
}
