use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Ingredient, IngredientInput, IngredientListFilter, ResultEngine, ingredients,
    recipe_requirements,
    util::{name_key, normalize_required_name},
};

use super::{Engine, row_limit, with_tx};

/// Checks an ingredient input and returns its normalized name.
fn validate_ingredient(input: &IngredientInput) -> ResultEngine<String> {
    let name = normalize_required_name(&input.name, "ingredient")?;
    input.quantity.ensure_stock()?;
    input.unit_price.ensure_price("unit price")?;
    Ok(name)
}

impl Engine {
    /// Adds an ingredient to the pantry.
    pub async fn new_ingredient(&self, input: IngredientInput) -> ResultEngine<Ingredient> {
        let name = validate_ingredient(&input)?;
        let now = Utc::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name,
            quantity: input.quantity,
            unit: input.unit,
            unit_price: input.unit_price,
            created_at: now,
            updated_at: now,
        };

        with_tx!(self, |db_tx| {
            let model: ingredients::ActiveModel = (&ingredient).into();
            model.insert(&db_tx).await?;
            Ok(ingredient)
        })
    }

    /// Return an ingredient snapshot from DB.
    pub async fn ingredient(&self, ingredient_id: Uuid) -> ResultEngine<Ingredient> {
        with_tx!(self, |db_tx| {
            let model = self.require_ingredient(&db_tx, ingredient_id).await?;
            Ingredient::try_from(model)
        })
    }

    /// Every ingredient, ordered by name.
    pub async fn list_ingredients(
        &self,
        filter: &IngredientListFilter,
    ) -> ResultEngine<Vec<Ingredient>> {
        with_tx!(self, |db_tx| {
            let mut query = ingredients::Entity::find();
            if filter.available_only {
                query = query.filter(ingredients::Column::QuantityMilli.gt(0));
            }
            if let Some(search) = filter.search.as_deref().map(name_key)
                && !search.is_empty()
            {
                query = query.filter(ingredients::Column::NameNorm.contains(search));
            }
            let models = query
                .order_by_asc(ingredients::Column::NameNorm)
                .order_by_asc(ingredients::Column::Id)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Ingredient::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Ingredients with something left in stock, ordered by name.
    pub async fn list_available_ingredients(&self) -> ResultEngine<Vec<Ingredient>> {
        self.list_ingredients(&IngredientListFilter {
            available_only: true,
            search: None,
        })
        .await
    }

    /// The `limit` ingredients closest to running out, lowest quantity first.
    pub async fn list_low_stock(&self, limit: u64) -> ResultEngine<Vec<Ingredient>> {
        with_tx!(self, |db_tx| {
            let models = ingredients::Entity::find()
                .order_by_asc(ingredients::Column::QuantityMilli)
                .order_by_asc(ingredients::Column::NameNorm)
                .limit(row_limit(limit))
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Ingredient::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Replaces every editable field of an ingredient.
    ///
    /// Takes the stock lock: a manual restock must not interleave with a
    /// purchase deducting from the same row.
    pub async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        input: IngredientInput,
    ) -> ResultEngine<Ingredient> {
        let name = validate_ingredient(&input)?;
        let _guard = self.stock_lock.lock().await;

        with_tx!(self, |db_tx| {
            let current = self.require_ingredient(&db_tx, ingredient_id).await?;
            let active = ingredients::ActiveModel {
                id: ActiveValue::Set(current.id),
                name_norm: ActiveValue::Set(name_key(&name)),
                name: ActiveValue::Set(name),
                quantity_milli: ActiveValue::Set(input.quantity.milli()),
                unit: ActiveValue::Set(input.unit.code().to_string()),
                unit_price_minor: ActiveValue::Set(input.unit_price.cents()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ingredient::try_from(model)
        })
    }

    /// Deletes an ingredient together with the recipe lines using it.
    pub async fn delete_ingredient(&self, ingredient_id: Uuid) -> ResultEngine<()> {
        let _guard = self.stock_lock.lock().await;

        with_tx!(self, |db_tx| {
            let model = self.require_ingredient(&db_tx, ingredient_id).await?;
            recipe_requirements::Entity::delete_many()
                .filter(recipe_requirements::Column::IngredientId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            let res = ingredients::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound("ingredient not exists".to_string()));
            }
            Ok(())
        })
    }
}
