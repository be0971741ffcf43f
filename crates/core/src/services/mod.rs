//! Business logic services.

pub mod cart;
pub mod favorite;
pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod shopping_list;
pub mod tag;
pub mod user;

pub use cart::CartService;
pub use favorite::FavoriteService;
pub use follow::{FollowService, Subscription};
pub use ingredient::IngredientService;
pub use recipe::{
    CreateRecipeInput, IngredientLineDetail, IngredientLineInput, RecipeDetail, RecipeListQuery,
    RecipeService, UpdateRecipeInput,
};
pub use shopping_list::{ShoppingListItem, ShoppingListService};
pub use tag::TagService;
pub use user::{CreateUserInput, UserService};
