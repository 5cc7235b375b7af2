//! Purchases.
//!
//! A [`Purchase`] records `quantity` units of a menu item sold at
//! `purchased_at`, logged by a user. Purchases are immutable once written.
//! The stored `menu_item_id` is kept as-is even after the menu item is
//! deleted, so the sales history stays intact.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub purchased_at: DateTime<Utc>,
    pub logged_by: String,
}

impl Purchase {
    /// Builds a new purchase, rejecting non-positive quantities.
    pub fn new(
        menu_item_id: Uuid,
        quantity: i64,
        logged_by: String,
        purchased_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if quantity <= 0 {
            return Err(EngineError::InvalidQuantity(
                "purchase quantity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            menu_item_id,
            quantity,
            purchased_at,
            logged_by,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub purchased_at: DateTimeUtc,
    pub logged_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LoggedBy",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Purchase> for ActiveModel {
    fn from(value: &Purchase) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            menu_item_id: ActiveValue::Set(value.menu_item_id.to_string()),
            quantity: ActiveValue::Set(value.quantity),
            purchased_at: ActiveValue::Set(value.purchased_at),
            logged_by: ActiveValue::Set(value.logged_by.clone()),
        }
    }
}

impl TryFrom<Model> for Purchase {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "purchase")?,
            menu_item_id: parse_uuid(&model.menu_item_id, "menu item")?,
            quantity: model.quantity,
            purchased_at: model.purchased_at,
            logged_by: model.logged_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        let menu_item_id = Uuid::new_v4();
        for quantity in [0, -3] {
            let err = Purchase::new(menu_item_id, quantity, "alice".to_string(), Utc::now())
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidQuantity(_)));
        }
        let purchase = Purchase::new(menu_item_id, 2, "alice".to_string(), Utc::now()).unwrap();
        assert_eq!(purchase.quantity, 2);
        assert_eq!(purchase.logged_by, "alice");
    }
}
