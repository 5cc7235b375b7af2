//! Inventory and costing engine.
//!
//! The engine owns the restaurant's stock (ingredients), its menu (menu items
//! and their recipes) and the sales history (purchases). Recording a purchase
//! consumes the recipe from the stock in the same database transaction, or
//! fails without touching anything.

pub use commands::{
    IngredientInput, IngredientListFilter, MenuItemInput, PurchaseCmd, PurchaseListFilter,
    RecipeRequirementInput,
};
pub use deduction::{Deduction, DeductionPlan, Shortfall, check_stock, plan_deduction};
pub use error::EngineError;
pub use ingredients::Ingredient;
pub use menu_items::MenuItem;
pub use money::Money;
pub use ops::{Dashboard, Engine, EngineBuilder, RecipeLine};
pub use purchases::Purchase;
pub use quantity::{QUANTITY_SCALE, Quantity};
pub use recipe_requirements::RecipeRequirement;
pub use report::{CostLine, ProfitReport, SaleLine, fold_report};
pub use unit::Unit;

mod commands;
mod deduction;
mod error;
mod ingredients;
mod menu_items;
mod money;
mod ops;
mod purchases;
mod quantity;
mod recipe_requirements;
mod report;
mod unit;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
