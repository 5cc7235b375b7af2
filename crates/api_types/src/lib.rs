//! JSON bodies of the Larder REST API.
//!
//! Amounts travel as decimal strings (`"12.50"` for money, `"0.25"` for
//! quantities) so clients never go through floating point. Every resource
//! carries its own `url`, and refers to other resources by url.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api`: where each collection lives.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiIndex {
    pub ingredients: String,
    pub menu_items: String,
    pub recipe_requirements: String,
    pub purchases: String,
    pub report: String,
    pub dashboard: String,
}

pub mod ingredient {
    use super::*;

    /// Create and full-update body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientNew {
        pub name: String,
        pub quantity: String,
        /// Unit code, e.g. `kg`, `pcs`, `egg`.
        pub unit: String,
        pub unit_price: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientView {
        pub url: String,
        pub id: Uuid,
        pub name: String,
        pub quantity: String,
        pub unit: String,
        /// `egg` or `eggs`, depending on `quantity`.
        pub unit_display: String,
        pub unit_price: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientsResponse {
        pub ingredients: Vec<IngredientView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IngredientListQuery {
        /// Only ingredients with quantity > 0.
        pub available: Option<bool>,
        pub search: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LowStockQuery {
        pub limit: Option<u64>,
    }
}

pub mod menu_item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MenuItemNew {
        pub name: String,
        pub price: String,
        #[serde(default)]
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MenuItemView {
        pub url: String,
        pub id: Uuid,
        pub name: String,
        pub price: String,
        pub image_url: Option<String>,
        /// Recipe lines of this item.
        pub recipe: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MenuItemsResponse {
        pub menu_items: Vec<MenuItemView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MenuItemListQuery {
        pub search: Option<String>,
    }
}

pub mod recipe {
    use super::*;

    /// Create and full-update body. `menu_item` and `ingredient` accept a
    /// resource url or a bare id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeRequirementNew {
        pub menu_item: String,
        pub ingredient: String,
        pub quantity: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeRequirementView {
        pub url: String,
        pub id: Uuid,
        pub menu_item: String,
        pub ingredient: String,
        pub quantity: String,
        /// e.g. `0.2 kg of Flour for Bread`.
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeRequirementsResponse {
        pub recipe_requirements: Vec<RecipeRequirementView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecipeListQuery {
        /// Url or id of a menu item.
        pub menu_item: Option<String>,
    }
}

pub mod purchase {
    use super::*;

    /// The purchase is logged by the authenticated user, now.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub menu_item: String,
        pub quantity: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseView {
        pub url: String,
        pub id: Uuid,
        pub menu_item: String,
        pub quantity: i64,
        pub purchased_at: DateTime<Utc>,
        pub logged_by: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PurchaseListQuery {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
        /// Inclusive lower bound.
        pub from: Option<DateTime<Utc>>,
        /// Exclusive upper bound.
        pub to: Option<DateTime<Utc>>,
        pub menu_item: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchasesResponse {
        pub purchases: Vec<PurchaseView>,
        /// Pass back as `cursor` to get the next (older) page.
        pub next_cursor: Option<String>,
    }
}

pub mod report {
    use super::{
        Deserialize, Serialize, ingredient::IngredientView, menu_item::MenuItemView,
        purchase::PurchaseView,
    };

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfitReportView {
        pub total_revenue: String,
        pub total_cost: String,
        pub profit: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub today_purchases: Vec<PurchaseView>,
        pub low_stock: Vec<IngredientView>,
        pub menu_items: Vec<MenuItemView>,
    }
}
