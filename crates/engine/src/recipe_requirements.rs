//! Recipe lines.
//!
//! A [`RecipeRequirement`] says "one unit of this menu item consumes this much
//! of this ingredient". The set of lines for a menu item is its bill of
//! materials. A menu item has at most one line per ingredient.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Quantity, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeRequirement {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub ingredient_id: Uuid,
    /// Consumed per unit sold, in the ingredient's unit.
    pub quantity: Quantity,
}

impl RecipeRequirement {
    pub fn new(menu_item_id: Uuid, ingredient_id: Uuid, quantity: Quantity) -> Self {
        Self {
            id: Uuid::new_v4(),
            menu_item_id,
            ingredient_id,
            quantity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recipe_requirements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub menu_item_id: String,
    pub ingredient_id: String,
    pub quantity_milli: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::menu_items::Entity",
        from = "Column::MenuItemId",
        to = "super::menu_items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    MenuItems,
    #[sea_orm(
        belongs_to = "super::ingredients::Entity",
        from = "Column::IngredientId",
        to = "super::ingredients::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ingredients,
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RecipeRequirement> for ActiveModel {
    fn from(value: &RecipeRequirement) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            menu_item_id: ActiveValue::Set(value.menu_item_id.to_string()),
            ingredient_id: ActiveValue::Set(value.ingredient_id.to_string()),
            quantity_milli: ActiveValue::Set(value.quantity.milli()),
        }
    }
}

impl TryFrom<Model> for RecipeRequirement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "recipe requirement")?,
            menu_item_id: parse_uuid(&model.menu_item_id, "menu item")?,
            ingredient_id: parse_uuid(&model.ingredient_id, "ingredient")?,
            quantity: Quantity::new(model.quantity_milli),
        })
    }
}
