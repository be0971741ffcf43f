//! Database repositories.

pub mod cart;
pub mod favorite;
pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use cart::CartRepository;
pub use favorite::FavoriteRepository;
pub use follow::FollowRepository;
pub use ingredient::IngredientRepository;
pub use recipe::{IngredientTotal, RecipeFilter, RecipeRepository};
pub use tag::TagRepository;
pub use user::UserRepository;
