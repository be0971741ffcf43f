//! Create recipe tag link table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecipeTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeTag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecipeTag::RecipeId).string_len(32).not_null())
                    .col(ColumnDef::new(RecipeTag::TagId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_tag_recipe")
                            .from(RecipeTag::Table, RecipeTag::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_tag_tag")
                            .from(RecipeTag::Table, RecipeTag::TagId)
                            .to(Tag::Table, Tag::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (recipe_id, tag_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_tag_pair")
                    .table(RecipeTag::Table)
                    .col(RecipeTag::RecipeId)
                    .col(RecipeTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (for tag filter queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_tag_tag_id")
                    .table(RecipeTag::Table)
                    .col(RecipeTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeTag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RecipeTag {
    Table,
    Id,
    RecipeId,
    TagId,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
}
