//! Initial schema.
//!
//! - `users`: credentials, and who logged a purchase
//! - `ingredients`: pantry stock, quantity in thousandths of a unit
//! - `menu_items`: sellable products, price in cents
//! - `recipe_requirements`: per-unit consumption of an ingredient by a menu item
//! - `purchases`: sales history; keeps `menu_item_id` even after the item is
//!   deleted, so there is no foreign key on it

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Ingredients {
    Table,
    Id,
    Name,
    NameNorm,
    QuantityMilli,
    Unit,
    UnitPriceMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MenuItems {
    Table,
    Id,
    Name,
    NameNorm,
    PriceMinor,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeRequirements {
    Table,
    Id,
    MenuItemId,
    IngredientId,
    QuantityMilli,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    MenuItemId,
    Quantity,
    PurchasedAt,
    LoggedBy,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ingredients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ingredients::Name).string().not_null())
                    .col(ColumnDef::new(Ingredients::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Ingredients::QuantityMilli)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Ingredients::QuantityMilli).gte(0)),
                    )
                    .col(ColumnDef::new(Ingredients::Unit).string().not_null())
                    .col(
                        ColumnDef::new(Ingredients::UnitPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ingredients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ingredients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ingredients-quantity_milli")
                    .table(Ingredients::Table)
                    .col(Ingredients::QuantityMilli)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuItems::Name).string().not_null())
                    .col(ColumnDef::new(MenuItems::NameNorm).string().not_null())
                    .col(ColumnDef::new(MenuItems::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::ImageUrl).string_len(200))
                    .col(
                        ColumnDef::new(MenuItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeRequirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeRequirements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecipeRequirements::MenuItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeRequirements::IngredientId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeRequirements::QuantityMilli)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_requirements-menu_item_id")
                            .from(RecipeRequirements::Table, RecipeRequirements::MenuItemId)
                            .to(MenuItems::Table, MenuItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_requirements-ingredient_id")
                            .from(RecipeRequirements::Table, RecipeRequirements::IngredientId)
                            .to(Ingredients::Table, Ingredients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_requirements-menu_item_id-ingredient_id-unique")
                    .table(RecipeRequirements::Table)
                    .col(RecipeRequirements::MenuItemId)
                    .col(RecipeRequirements::IngredientId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_requirements-ingredient_id")
                    .table(RecipeRequirements::Table)
                    .col(RecipeRequirements::IngredientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::MenuItemId).string().not_null())
                    .col(ColumnDef::new(Purchases::Quantity).big_integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Purchases::LoggedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-logged_by")
                            .from(Purchases::Table, Purchases::LoggedBy)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-purchased_at")
                    .table(Purchases::Table)
                    .col(Purchases::PurchasedAt)
                    .col(Purchases::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-menu_item_id")
                    .table(Purchases::Table)
                    .col(Purchases::MenuItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeRequirements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
