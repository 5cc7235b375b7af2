use chrono::{DateTime, Days, Utc};

use crate::{Ingredient, MenuItem, Purchase, ResultEngine};

use super::Engine;

/// Ingredients shown in the dashboard's low stock panel.
const LOW_STOCK_PANEL: u64 = 5;

/// What the front page shows at a glance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    /// Purchases of the UTC day containing `now`, newest first.
    pub today_purchases: Vec<Purchase>,
    pub low_stock: Vec<Ingredient>,
    pub menu_items: Vec<MenuItem>,
}

impl Engine {
    pub async fn dashboard(&self, now: DateTime<Utc>) -> ResultEngine<Dashboard> {
        let start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(now);
        let end = start.checked_add_days(Days::new(1)).unwrap_or(now);

        let today_purchases = self.list_purchases_between(start, end).await?;
        let low_stock = self.list_low_stock(LOW_STOCK_PANEL).await?;
        let menu_items = self.list_menu_items(None).await?;

        Ok(Dashboard {
            today_purchases,
            low_stock,
            menu_items,
        })
    }
}
