//! Stock deduction for a purchase, split in two phases.
//!
//! 1. [`check_stock`] is pure: given the recipe of a menu item (each line
//!    paired with the current state of its ingredient) and the number of
//!    units sold, it returns every ingredient that would go below zero.
//! 2. [`plan_deduction`] turns a clean check into the list of decrements to
//!    apply. It refuses to produce a plan when any shortfall exists, so a
//!    purchase either consumes its whole recipe or nothing.
//!
//! Lines that point to the same ingredient are summed before comparing with
//! the stock.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{EngineError, Ingredient, Quantity, RecipeRequirement, ResultEngine};

/// An ingredient that cannot cover a purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub available: Quantity,
    pub needed: Quantity,
}

/// One decrement to apply to an ingredient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deduction {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub amount: Quantity,
    pub remaining: Quantity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeductionPlan {
    pub deductions: Vec<Deduction>,
}

struct Needed<'a> {
    ingredient: &'a Ingredient,
    amount: Quantity,
}

fn total_needed(
    lines: &[(RecipeRequirement, Ingredient)],
    sold: i64,
) -> ResultEngine<Vec<Needed<'_>>> {
    let mut needed: Vec<Needed<'_>> = Vec::with_capacity(lines.len());
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for (requirement, ingredient) in lines {
        let amount = requirement.quantity.times(sold)?;
        match index.get(&ingredient.id) {
            Some(&pos) => {
                needed[pos].amount = needed[pos].amount.checked_add(amount)?;
            }
            None => {
                index.insert(ingredient.id, needed.len());
                needed.push(Needed { ingredient, amount });
            }
        }
    }

    Ok(needed)
}

/// Returns every ingredient whose stock is below what `sold` units of the
/// recipe consume. An empty result means the purchase can be applied.
pub fn check_stock(
    lines: &[(RecipeRequirement, Ingredient)],
    sold: i64,
) -> ResultEngine<Vec<Shortfall>> {
    let shortfalls = total_needed(lines, sold)?
        .into_iter()
        .filter(|n| n.ingredient.quantity < n.amount)
        .map(|n| Shortfall {
            ingredient_id: n.ingredient.id,
            ingredient_name: n.ingredient.name.clone(),
            available: n.ingredient.quantity,
            needed: n.amount,
        })
        .collect();
    Ok(shortfalls)
}

/// Checks the whole recipe first, then builds the decrements.
///
/// Fails with [`EngineError::InsufficientStock`] naming the first ingredient
/// (in recipe order) that falls short.
pub fn plan_deduction(
    lines: &[(RecipeRequirement, Ingredient)],
    sold: i64,
) -> ResultEngine<DeductionPlan> {
    if sold <= 0 {
        return Err(EngineError::InvalidQuantity(
            "purchase quantity must be > 0".to_string(),
        ));
    }

    if let Some(shortfall) = check_stock(lines, sold)?.into_iter().next() {
        return Err(EngineError::InsufficientStock(shortfall.ingredient_name));
    }

    let mut deductions = Vec::with_capacity(lines.len());
    for n in total_needed(lines, sold)? {
        let remaining = n
            .ingredient
            .quantity
            .checked_sub(n.amount)
            .ok_or_else(|| EngineError::InsufficientStock(n.ingredient.name.clone()))?;
        deductions.push(Deduction {
            ingredient_id: n.ingredient.id,
            ingredient_name: n.ingredient.name.clone(),
            amount: n.amount,
            remaining,
        });
    }

    Ok(DeductionPlan { deductions })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Money, Unit};

    fn ingredient(name: &str, quantity: i64) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            quantity: Quantity::from_units(quantity),
            unit: Unit::Piece,
            unit_price: Money::new(50),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(ingredient: &Ingredient, per_unit: i64) -> (RecipeRequirement, Ingredient) {
        (
            RecipeRequirement::new(Uuid::new_v4(), ingredient.id, Quantity::from_units(per_unit)),
            ingredient.clone(),
        )
    }

    #[test]
    fn plan_scales_by_units_sold() {
        let bun = ingredient("Bun", 10);
        let patty = ingredient("Patty", 5);
        let lines = vec![line(&bun, 2), line(&patty, 1)];

        let plan = plan_deduction(&lines, 3).unwrap();

        assert_eq!(plan.deductions.len(), 2);
        assert_eq!(plan.deductions[0].amount, Quantity::from_units(6));
        assert_eq!(plan.deductions[0].remaining, Quantity::from_units(4));
        assert_eq!(plan.deductions[1].amount, Quantity::from_units(3));
        assert_eq!(plan.deductions[1].remaining, Quantity::from_units(2));
    }

    #[test]
    fn check_reports_every_shortfall() {
        let bun = ingredient("Bun", 1);
        let patty = ingredient("Patty", 0);
        let cheese = ingredient("Cheese", 100);
        let lines = vec![line(&bun, 2), line(&patty, 1), line(&cheese, 1)];

        let shortfalls = check_stock(&lines, 1).unwrap();

        let names: Vec<_> = shortfalls.iter().map(|s| s.ingredient_name.as_str()).collect();
        assert_eq!(names, vec!["Bun", "Patty"]);
        assert_eq!(shortfalls[0].needed, Quantity::from_units(2));
        assert_eq!(shortfalls[0].available, Quantity::from_units(1));
    }

    #[test]
    fn one_short_ingredient_rejects_the_whole_plan() {
        let bun = ingredient("Bun", 10);
        let patty = ingredient("Patty", 1);
        let lines = vec![line(&bun, 2), line(&patty, 1)];

        let err = plan_deduction(&lines, 2).unwrap_err();
        assert_eq!(err, EngineError::InsufficientStock("Patty".to_string()));
    }

    #[test]
    fn exact_stock_is_enough() {
        let bun = ingredient("Bun", 4);
        let lines = vec![line(&bun, 2)];

        let plan = plan_deduction(&lines, 2).unwrap();
        assert_eq!(plan.deductions[0].remaining, Quantity::ZERO);
    }

    #[test]
    fn repeated_ingredient_lines_are_summed() {
        let egg = ingredient("Egg", 3);
        let lines = vec![line(&egg, 1), line(&egg, 1)];

        let err = plan_deduction(&lines, 2).unwrap_err();
        assert_eq!(err, EngineError::InsufficientStock("Egg".to_string()));

        let plan = plan_deduction(&lines, 1).unwrap();
        assert_eq!(plan.deductions.len(), 1);
        assert_eq!(plan.deductions[0].amount, Quantity::from_units(2));
    }

    #[test]
    fn empty_recipe_yields_empty_plan() {
        assert_eq!(plan_deduction(&[], 5).unwrap(), DeductionPlan::default());
    }

    #[test]
    fn non_positive_sales_are_rejected() {
        let bun = ingredient("Bun", 4);
        let lines = vec![line(&bun, 1)];
        assert!(matches!(
            plan_deduction(&lines, 0),
            Err(EngineError::InvalidQuantity(_))
        ));
    }
}
