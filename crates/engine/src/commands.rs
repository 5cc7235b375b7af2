//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Create and update share the same
//! input: an update replaces every editable field.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Money, Quantity, Unit};

/// Fields of an ingredient.
#[derive(Clone, Debug)]
pub struct IngredientInput {
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
    pub unit_price: Money,
}

impl IngredientInput {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: Quantity, unit: Unit, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
            unit_price,
        }
    }
}

/// Fields of a menu item.
#[derive(Clone, Debug)]
pub struct MenuItemInput {
    pub name: String,
    pub price: Money,
    pub image_url: Option<String>,
}

impl MenuItemInput {
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            image_url: None,
        }
    }

    #[must_use]
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Fields of a recipe line.
#[derive(Clone, Copy, Debug)]
pub struct RecipeRequirementInput {
    pub menu_item_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Quantity,
}

impl RecipeRequirementInput {
    #[must_use]
    pub fn new(menu_item_id: Uuid, ingredient_id: Uuid, quantity: Quantity) -> Self {
        Self {
            menu_item_id,
            ingredient_id,
            quantity,
        }
    }
}

/// Record a sale of a menu item.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub logged_by: String,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseCmd {
    /// A purchase happening now.
    #[must_use]
    pub fn new(menu_item_id: Uuid, quantity: i64, logged_by: impl Into<String>) -> Self {
        Self {
            menu_item_id,
            quantity,
            logged_by: logged_by.into(),
            purchased_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn purchased_at(mut self, purchased_at: DateTime<Utc>) -> Self {
        self.purchased_at = purchased_at;
        self
    }
}

/// Filters for listing purchases.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct PurchaseListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub menu_item_id: Option<Uuid>,
}

/// Filters for listing ingredients.
#[derive(Clone, Debug, Default)]
pub struct IngredientListFilter {
    /// Only ingredients with quantity > 0.
    pub available_only: bool,
    /// Case and accent insensitive substring of the name.
    pub search: Option<String>,
}
