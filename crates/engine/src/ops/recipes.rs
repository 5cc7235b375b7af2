use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Ingredient, RecipeRequirement, RecipeRequirementInput, ResultEngine, Unit,
    ingredients, menu_items, recipe_requirements,
};

use super::{Engine, with_tx};

/// A recipe line with the records it points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeLine {
    pub requirement: RecipeRequirement,
    pub ingredient: Ingredient,
    pub menu_item_name: String,
}

impl RecipeLine {
    /// Human readable form: `2 eggs for Omelette`, `0.2 kg of Flour for Bread`.
    pub fn description(&self) -> String {
        let quantity = self.requirement.quantity;
        if self.ingredient.unit == Unit::Egg {
            format!(
                "{quantity} {} for {}",
                Unit::Egg.label(quantity),
                self.menu_item_name
            )
        } else {
            format!(
                "{quantity} {} of {} for {}",
                self.ingredient.unit.code(),
                self.ingredient.name,
                self.menu_item_name
            )
        }
    }
}

impl Engine {
    /// Adds a line to a menu item's recipe.
    ///
    /// A menu item may list each ingredient once.
    pub async fn new_recipe_requirement(
        &self,
        input: RecipeRequirementInput,
    ) -> ResultEngine<RecipeLine> {
        input.quantity.ensure_positive("required quantity")?;
        with_tx!(self, |db_tx| {
            let menu_item = self.require_menu_item(&db_tx, input.menu_item_id).await?;
            let ingredient = self.require_ingredient(&db_tx, input.ingredient_id).await?;
            self.ensure_unique_line(&db_tx, input.menu_item_id, input.ingredient_id, None)
                .await?;

            let requirement =
                RecipeRequirement::new(input.menu_item_id, input.ingredient_id, input.quantity);
            let model: recipe_requirements::ActiveModel = (&requirement).into();
            model.insert(&db_tx).await?;

            Ok(RecipeLine {
                requirement,
                ingredient: Ingredient::try_from(ingredient)?,
                menu_item_name: menu_item.name,
            })
        })
    }

    pub async fn recipe_requirement(&self, requirement_id: Uuid) -> ResultEngine<RecipeLine> {
        with_tx!(self, |db_tx| self.load_line(&db_tx, requirement_id).await)
    }

    /// Recipe lines, grouped by menu item. With `menu_item_id` set, only
    /// that item's recipe (which may be empty).
    pub async fn list_recipe_requirements(
        &self,
        menu_item_id: Option<Uuid>,
    ) -> ResultEngine<Vec<RecipeLine>> {
        with_tx!(self, |db_tx| {
            let mut query = recipe_requirements::Entity::find();
            if let Some(menu_item_id) = menu_item_id {
                query = query
                    .filter(recipe_requirements::Column::MenuItemId.eq(menu_item_id.to_string()));
            }
            let rows = query
                .find_also_related(ingredients::Entity)
                .order_by_asc(recipe_requirements::Column::MenuItemId)
                .order_by_asc(ingredients::Column::NameNorm)
                .all(&db_tx)
                .await?;

            let names = self.menu_item_names(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for (model, ingredient) in rows {
                let Some(ingredient) = ingredient else {
                    continue;
                };
                let menu_item_name = names.get(&model.menu_item_id).cloned().unwrap_or_default();
                out.push(RecipeLine {
                    requirement: RecipeRequirement::try_from(model)?,
                    ingredient: Ingredient::try_from(ingredient)?,
                    menu_item_name,
                });
            }
            Ok(out)
        })
    }

    /// Full recipe of one menu item.
    pub async fn menu_item_recipe(&self, menu_item_id: Uuid) -> ResultEngine<Vec<RecipeLine>> {
        self.menu_item(menu_item_id).await?;
        self.list_recipe_requirements(Some(menu_item_id)).await
    }

    /// Replaces a recipe line: its menu item, ingredient and quantity.
    pub async fn update_recipe_requirement(
        &self,
        requirement_id: Uuid,
        input: RecipeRequirementInput,
    ) -> ResultEngine<RecipeLine> {
        input.quantity.ensure_positive("required quantity")?;
        with_tx!(self, |db_tx| {
            self.require_requirement(&db_tx, requirement_id).await?;
            self.require_menu_item(&db_tx, input.menu_item_id).await?;
            self.require_ingredient(&db_tx, input.ingredient_id).await?;
            self.ensure_unique_line(
                &db_tx,
                input.menu_item_id,
                input.ingredient_id,
                Some(requirement_id),
            )
            .await?;

            let active = recipe_requirements::ActiveModel {
                id: ActiveValue::Set(requirement_id.to_string()),
                menu_item_id: ActiveValue::Set(input.menu_item_id.to_string()),
                ingredient_id: ActiveValue::Set(input.ingredient_id.to_string()),
                quantity_milli: ActiveValue::Set(input.quantity.milli()),
            };
            active.update(&db_tx).await?;
            self.load_line(&db_tx, requirement_id).await
        })
    }

    pub async fn delete_recipe_requirement(&self, requirement_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let res = recipe_requirements::Entity::delete_by_id(requirement_id.to_string())
                .exec(&db_tx)
                .await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound(
                    "recipe requirement not exists".to_string(),
                ));
            }
            Ok(())
        })
    }

    async fn require_requirement(
        &self,
        db: &DatabaseTransaction,
        requirement_id: Uuid,
    ) -> ResultEngine<recipe_requirements::Model> {
        recipe_requirements::Entity::find_by_id(requirement_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("recipe requirement not exists".to_string()))
    }

    async fn load_line(
        &self,
        db: &DatabaseTransaction,
        requirement_id: Uuid,
    ) -> ResultEngine<RecipeLine> {
        let model = self.require_requirement(db, requirement_id).await?;
        let requirement = RecipeRequirement::try_from(model)?;
        let ingredient = self.require_ingredient(db, requirement.ingredient_id).await?;
        let menu_item = self.require_menu_item(db, requirement.menu_item_id).await?;
        Ok(RecipeLine {
            requirement,
            ingredient: Ingredient::try_from(ingredient)?,
            menu_item_name: menu_item.name,
        })
    }

    async fn ensure_unique_line(
        &self,
        db: &DatabaseTransaction,
        menu_item_id: Uuid,
        ingredient_id: Uuid,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = recipe_requirements::Entity::find()
            .filter(recipe_requirements::Column::MenuItemId.eq(menu_item_id.to_string()))
            .filter(recipe_requirements::Column::IngredientId.eq(ingredient_id.to_string()));
        if let Some(except) = except {
            query = query.filter(recipe_requirements::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(
                "ingredient already in this recipe".to_string(),
            ));
        }
        Ok(())
    }

    async fn menu_item_names(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<HashMap<String, String>> {
        let models = menu_items::Entity::find().all(db).await?;
        Ok(models.into_iter().map(|m| (m.id, m.name)).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Money, Quantity};

    fn line(unit: Unit, quantity: Quantity) -> RecipeLine {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name: "Flour".to_string(),
            quantity: Quantity::from_units(10),
            unit,
            unit_price: Money::new(120),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        RecipeLine {
            requirement: RecipeRequirement::new(Uuid::new_v4(), ingredient.id, quantity),
            ingredient,
            menu_item_name: "Bread".to_string(),
        }
    }

    #[test]
    fn description_names_unit_and_ingredient() {
        let line = line(Unit::Kilogram, Quantity::new(200));
        assert_eq!(line.description(), "0.2 kg of Flour for Bread");
    }

    #[test]
    fn egg_description_is_pluralized() {
        assert_eq!(
            line(Unit::Egg, Quantity::from_units(1)).description(),
            "1 egg for Bread"
        );
        assert_eq!(
            line(Unit::Egg, Quantity::from_units(3)).description(),
            "3 eggs for Bread"
        );
    }
}
