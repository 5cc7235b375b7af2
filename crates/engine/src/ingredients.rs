//! The module contains the `Ingredient` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, Quantity, Unit, util::parse_uuid};

/// A stocked raw material.
///
/// `quantity` is what is currently in the pantry, `unit_price` what one unit
/// of it costs. The quantity is never negative: it only changes through an
/// explicit edit or a purchase deduction, and both refuse to go below zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Unit label matching the current quantity ("egg" vs "eggs").
    pub fn unit_display(&self) -> &'static str {
        self.unit.label(self.quantity)
    }

    /// `true` when there is something left in stock.
    pub fn is_available(&self) -> bool {
        self.quantity > Quantity::ZERO
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub quantity_milli: i64,
    pub unit: String,
    pub unit_price_minor: i64,
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

impl From<&Ingredient> for ActiveModel {
    fn from(value: &Ingredient) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(crate::util::name_key(&value.name)),
            quantity_milli: ActiveValue::Set(value.quantity.milli()),
            unit: ActiveValue::Set(value.unit.code().to_string()),
            unit_price_minor: ActiveValue::Set(value.unit_price.cents()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Ingredient {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ingredient")?,
            name: model.name,
            quantity: Quantity::new(model.quantity_milli),
            unit: Unit::try_from(model.unit.as_str())?,
            unit_price: Money::new(model.unit_price_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn model(quantity_milli: i64, unit: &str) -> Model {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        Model {
            id: "6a8416ed-b8e6-4732-a591-bf55da9687e7".to_string(),
            name: "Eggs".to_string(),
            name_norm: "eggs".to_string(),
            quantity_milli,
            unit: unit.to_string(),
            unit_price_minor: 25,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn unit_display_follows_quantity() {
        let one = Ingredient::try_from(model(1000, "egg")).unwrap();
        assert_eq!(one.unit_display(), "egg");
        let two = Ingredient::try_from(model(2000, "egg")).unwrap();
        assert_eq!(two.unit_display(), "eggs");
    }

    #[test]
    fn availability() {
        assert!(!Ingredient::try_from(model(0, "egg")).unwrap().is_available());
        assert!(Ingredient::try_from(model(1, "egg")).unwrap().is_available());
    }

    #[test]
    #[should_panic(expected = "InvalidUnit(\"unsupported unit: bushel\")")]
    fn unknown_stored_unit_fails() {
        Ingredient::try_from(model(1000, "bushel")).unwrap();
    }

    #[test]
    fn active_model_keeps_search_key() {
        let ingredient = Ingredient::try_from(model(1000, "egg")).unwrap();
        let active = ActiveModel::from(&ingredient);
        assert_eq!(active.name_norm, ActiveValue::Set("eggs".to_string()));
        assert_eq!(active.quantity_milli, ActiveValue::Set(1000));
    }
}
