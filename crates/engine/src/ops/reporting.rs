use std::collections::HashMap;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    CostLine, Money, ProfitReport, Quantity, ResultEngine, SaleLine, fold_report, ingredients,
    menu_items, purchases, recipe_requirements,
};

use super::{Engine, with_tx};

impl Engine {
    /// Revenue, cost and profit over every recorded purchase.
    ///
    /// Priced with today's menu prices, unit prices and recipes. Purchases
    /// of menu items that no longer exist are left out.
    pub async fn profit_report(&self) -> ResultEngine<ProfitReport> {
        with_tx!(self, |db_tx| {
            let prices: HashMap<String, Money> = menu_items::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| (m.id, Money::new(m.price_minor)))
                .collect();

            let mut recipes: HashMap<String, Vec<CostLine>> = HashMap::new();
            let rows = recipe_requirements::Entity::find()
                .find_also_related(ingredients::Entity)
                .all(&db_tx)
                .await?;
            for (requirement, ingredient) in rows {
                let Some(ingredient) = ingredient else {
                    continue;
                };
                recipes
                    .entry(requirement.menu_item_id)
                    .or_default()
                    .push(CostLine {
                        unit_price: Money::new(ingredient.unit_price_minor),
                        quantity: Quantity::new(requirement.quantity_milli),
                    });
            }

            let sales = purchases::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .filter_map(|purchase| {
                    let price = *prices.get(&purchase.menu_item_id)?;
                    Some(SaleLine {
                        price,
                        sold: purchase.quantity,
                        recipe: recipes
                            .get(&purchase.menu_item_id)
                            .cloned()
                            .unwrap_or_default(),
                    })
                });

            fold_report(sales)
        })
    }
}
