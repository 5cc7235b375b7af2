//! The module contains the `MenuItem` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

/// A sellable product.
///
/// Its recipe lives in `recipe_requirements`; purchases reference it by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub price_minor: i64,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_requirements::Entity")]
    RecipeRequirements,
}

impl Related<super::recipe_requirements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeRequirements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MenuItem> for ActiveModel {
    fn from(value: &MenuItem) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(crate::util::name_key(&value.name)),
            price_minor: ActiveValue::Set(value.price.cents()),
            image_url: ActiveValue::Set(value.image_url.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for MenuItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "menu item")?,
            name: model.name,
            price: Money::new(model.price_minor),
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
