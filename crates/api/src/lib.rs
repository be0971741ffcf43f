//! HTTP API layer for foodgram-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: recipes, tags, ingredients, users
//! - **Extractors**: authentication
//! - **Middleware**: token resolution, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
