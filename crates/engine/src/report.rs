//! Revenue, cost and profit over the purchase history.
//!
//! Costs are computed from the **current** ingredient prices and recipes,
//! not from the values in effect when each purchase happened.

use crate::{EngineError, Money, Quantity, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProfitReport {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub profit: Money,
}

/// One recipe line priced at today's unit price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostLine {
    pub unit_price: Money,
    pub quantity: Quantity,
}

/// A purchase joined with the current price and recipe of its menu item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleLine {
    pub price: Money,
    pub sold: i64,
    pub recipe: Vec<CostLine>,
}

fn overflow() -> EngineError {
    EngineError::InvalidQuantity("report total too large".to_string())
}

/// Folds sales into a report.
///
/// Revenue is exact in cents. Cost is accumulated exactly in thousandths of
/// a cent (`cents * thousandths of a unit`) and rounded to cents once.
pub fn fold_report<I>(sales: I) -> ResultEngine<ProfitReport>
where
    I: IntoIterator<Item = SaleLine>,
{
    let mut revenue: i128 = 0;
    let mut cost_milli_cents: i128 = 0;

    for sale in sales {
        let sold = i128::from(sale.sold);
        revenue = revenue
            .checked_add(i128::from(sale.price.cents()) * sold)
            .ok_or_else(overflow)?;
        for line in &sale.recipe {
            let line_cost = i128::from(line.unit_price.cents())
                .checked_mul(i128::from(line.quantity.milli()))
                .and_then(|v| v.checked_mul(sold))
                .ok_or_else(overflow)?;
            cost_milli_cents = cost_milli_cents
                .checked_add(line_cost)
                .ok_or_else(overflow)?;
        }
    }

    let total_revenue = Money::new(i64::try_from(revenue).map_err(|_| overflow())?);
    let total_cost = Money::from_milli_cents(cost_milli_cents)?;
    Ok(ProfitReport {
        total_revenue,
        total_cost,
        profit: total_revenue - total_cost,
    })
}
