//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250301_000001_create_user_table;
mod m20250301_000002_create_ingredient_table;
mod m20250301_000003_create_tag_table;
mod m20250301_000004_create_recipe_table;
mod m20250301_000005_create_recipe_ingredient_table;
mod m20250301_000006_create_recipe_tag_table;
mod m20250301_000007_create_favorite_table;
mod m20250301_000008_create_cart_entry_table;
mod m20250301_000009_create_follow_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_user_table::Migration),
            Box::new(m20250301_000002_create_ingredient_table::Migration),
            Box::new(m20250301_000003_create_tag_table::Migration),
            Box::new(m20250301_000004_create_recipe_table::Migration),
            Box::new(m20250301_000005_create_recipe_ingredient_table::Migration),
            Box::new(m20250301_000006_create_recipe_tag_table::Migration),
            Box::new(m20250301_000007_create_favorite_table::Migration),
            Box::new(m20250301_000008_create_cart_entry_table::Migration),
            Box::new(m20250301_000009_create_follow_table::Migration),
        ]
    }
}
