//! Resource urls.
//!
//! Bodies link to each other with absolute paths (`/api/ingredients/<id>`).
//! Incoming references accept either such a path (optionally with scheme
//! and host) or the bare id.

use engine::EngineError;
use uuid::Uuid;

use crate::ServerError;

pub const API: &str = "/api";
pub const INGREDIENTS: &str = "/api/ingredients";
pub const MENU_ITEMS: &str = "/api/menu-items";
pub const RECIPE_REQUIREMENTS: &str = "/api/recipe-requirements";
pub const PURCHASES: &str = "/api/purchases";
pub const REPORT: &str = "/api/report";
pub const DASHBOARD: &str = "/api/dashboard";

pub fn ingredient(id: Uuid) -> String {
    format!("{INGREDIENTS}/{id}")
}

pub fn menu_item(id: Uuid) -> String {
    format!("{MENU_ITEMS}/{id}")
}

pub fn recipe_requirement(id: Uuid) -> String {
    format!("{RECIPE_REQUIREMENTS}/{id}")
}

pub fn purchase(id: Uuid) -> String {
    format!("{PURCHASES}/{id}")
}

/// Recipe of a menu item, as a filtered collection url.
pub fn menu_item_recipe(id: Uuid) -> String {
    format!("{RECIPE_REQUIREMENTS}?menu_item={id}")
}

/// Resolves a reference into `collection` (one of the constants above).
pub fn parse_ref(value: &str, collection: &str, label: &str) -> Result<Uuid, ServerError> {
    let invalid = || ServerError::Engine(EngineError::InvalidId(format!("invalid {label} reference")));

    let value = value.trim().trim_end_matches('/');
    let Some((path, id)) = value.rsplit_once('/') else {
        return Uuid::parse_str(value).map_err(|_| invalid());
    };
    if !path.ends_with(collection) {
        return Err(invalid());
    }
    Uuid::parse_str(id).map_err(|_| invalid())
}
