use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Deduction, DeductionPlan, EngineError, Ingredient, Purchase, PurchaseCmd, PurchaseListFilter,
    RecipeRequirement, ResultEngine, ingredients, plan_deduction, purchases, recipe_requirements,
};

use super::{Engine, row_limit, with_tx};

fn validate_list_filter(filter: &PurchaseListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidRange(
            "from must be before to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyPurchaseFilters: QueryFilter + Sized {
    fn apply_purchase_filters(self, filter: &PurchaseListFilter) -> Self;
}

impl<T> ApplyPurchaseFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_purchase_filters(mut self, filter: &PurchaseListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(purchases::Column::PurchasedAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(purchases::Column::PurchasedAt.lt(to));
        }
        if let Some(menu_item_id) = filter.menu_item_id {
            self = self.filter(purchases::Column::MenuItemId.eq(menu_item_id.to_string()));
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PurchasesCursor {
    purchased_at: DateTime<Utc>,
    purchase_id: String,
}

impl PurchasesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid purchases cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid purchases cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid purchases cursor".to_string()))
    }
}

/// Subtracts `deduction.amount` from the ingredient only while the stored
/// quantity still covers it. A row that no longer matches means the stock
/// moved since the plan was built (another process writing the same
/// database), and the purchase fails with `InsufficientStock`.
async fn apply_deduction<C: ConnectionTrait>(
    db: &C,
    deduction: &Deduction,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let amount = deduction.amount.milli();
    let res = ingredients::Entity::update_many()
        .col_expr(
            ingredients::Column::QuantityMilli,
            Expr::col(ingredients::Column::QuantityMilli).sub(amount),
        )
        .col_expr(ingredients::Column::UpdatedAt, Expr::value(now))
        .filter(ingredients::Column::Id.eq(deduction.ingredient_id.to_string()))
        .filter(ingredients::Column::QuantityMilli.gte(amount))
        .exec(db)
        .await?;
    if res.rows_affected != 1 {
        return Err(EngineError::InsufficientStock(
            deduction.ingredient_name.clone(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Records a sale happening now. See [`Engine::record_purchase`].
    pub async fn create_purchase(
        &self,
        menu_item_id: Uuid,
        quantity: i64,
        logged_by: &str,
    ) -> ResultEngine<Purchase> {
        self.record_purchase(PurchaseCmd::new(menu_item_id, quantity, logged_by))
            .await
    }

    /// Records a sale and consumes its recipe from the stock.
    ///
    /// The purchase row and every ingredient decrement are written in one
    /// database transaction. If any ingredient cannot cover the sale the
    /// whole transaction is dropped: no purchase exists and no quantity
    /// changes.
    pub async fn record_purchase(&self, cmd: PurchaseCmd) -> ResultEngine<Purchase> {
        let purchase = Purchase::new(
            cmd.menu_item_id,
            cmd.quantity,
            cmd.logged_by,
            cmd.purchased_at,
        )?;

        let _guard = self.stock_lock.lock().await;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &purchase.logged_by).await?;
            let menu_item = self.require_menu_item(&db_tx, purchase.menu_item_id).await?;

            let model: purchases::ActiveModel = (&purchase).into();
            model.insert(&db_tx).await?;

            let plan = self.deduct_stock(&db_tx, &purchase).await?;
            tracing::info!(
                "purchase {}: {} x {} by {}, {} ingredients deducted",
                purchase.id,
                purchase.quantity,
                menu_item.name,
                purchase.logged_by,
                plan.deductions.len()
            );
            Ok(purchase)
        })
    }

    /// Check-then-apply deduction for `purchase`, inside the caller's
    /// transaction.
    ///
    /// Each decrement is a guarded update that only matches while the stored
    /// quantity still covers it, so the stock never goes below zero even if
    /// the row changed after it was read.
    async fn deduct_stock(
        &self,
        db: &DatabaseTransaction,
        purchase: &Purchase,
    ) -> ResultEngine<DeductionPlan> {
        let rows = recipe_requirements::Entity::find()
            .filter(recipe_requirements::Column::MenuItemId.eq(purchase.menu_item_id.to_string()))
            .find_also_related(ingredients::Entity)
            .order_by_asc(ingredients::Column::NameNorm)
            .all(db)
            .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for (requirement, ingredient) in rows {
            let ingredient = ingredient
                .ok_or_else(|| EngineError::KeyNotFound("ingredient not exists".to_string()))?;
            lines.push((
                RecipeRequirement::try_from(requirement)?,
                Ingredient::try_from(ingredient)?,
            ));
        }

        let plan = plan_deduction(&lines, purchase.quantity).inspect_err(|err| {
            tracing::warn!("purchase of {} rejected: {err}", purchase.menu_item_id);
        })?;

        let now = Utc::now();
        for deduction in &plan.deductions {
            apply_deduction(db, deduction, now)
                .await
                .inspect_err(|err| {
                    if matches!(err, EngineError::InsufficientStock(_)) {
                        tracing::warn!(
                            "stock of {} changed during purchase {}",
                            deduction.ingredient_name,
                            purchase.id
                        );
                    }
                })?;
        }

        Ok(plan)
    }

    pub async fn purchase(&self, purchase_id: Uuid) -> ResultEngine<Purchase> {
        with_tx!(self, |db_tx| {
            let model = purchases::Entity::find_by_id(purchase_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("purchase not exists".to_string()))?;
            Purchase::try_from(model)
        })
    }

    /// Lists recent purchases, newest first.
    pub async fn list_purchases(
        &self,
        limit: u64,
        filter: &PurchaseListFilter,
    ) -> ResultEngine<Vec<Purchase>> {
        let (items, _next) = self.list_purchases_page(limit, None, filter).await?;
        Ok(items)
    }

    /// Every purchase in `[from, to)`, newest first.
    pub async fn list_purchases_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultEngine<Vec<Purchase>> {
        let filter = PurchaseListFilter {
            from: Some(from),
            to: Some(to),
            menu_item_id: None,
        };
        validate_list_filter(&filter)?;
        with_tx!(self, |db_tx| {
            let models = purchases::Entity::find()
                .apply_purchase_filters(&filter)
                .order_by_desc(purchases::Column::PurchasedAt)
                .order_by_desc(purchases::Column::Id)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Purchase::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Lists purchases with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(purchased_at DESC, purchase_id
    /// DESC)`.
    pub async fn list_purchases_page(
        &self,
        limit: u64,
        cursor: Option<&str>,
        filter: &PurchaseListFilter,
    ) -> ResultEngine<(Vec<Purchase>, Option<String>)> {
        validate_list_filter(filter)?;
        let limit = row_limit(limit);
        with_tx!(self, |db_tx| {
            let limit_plus_one = limit.saturating_add(1);
            let mut query = purchases::Entity::find()
                .apply_purchase_filters(filter)
                .order_by_desc(purchases::Column::PurchasedAt)
                .order_by_desc(purchases::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = PurchasesCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(purchases::Column::PurchasedAt.lt(cursor.purchased_at))
                        .add(
                            Condition::all()
                                .add(purchases::Column::PurchasedAt.eq(cursor.purchased_at))
                                .add(purchases::Column::Id.lt(cursor.purchase_id)),
                        ),
                );
            }

            let models = query.all(&db_tx).await?;
            let has_more = models.len() > limit as usize;

            let out = models
                .into_iter()
                .take(limit as usize)
                .map(Purchase::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let next_cursor = if has_more {
                out.last()
                    .map(|p| PurchasesCursor {
                        purchased_at: p.purchased_at,
                        purchase_id: p.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_survives_encoding() {
        let cursor = PurchasesCursor {
            purchased_at: Utc::now(),
            purchase_id: Uuid::new_v4().to_string(),
        };
        let decoded = PurchasesCursor::decode(&cursor.encode().unwrap()).unwrap();
        assert_eq!(decoded.purchase_id, cursor.purchase_id);
        assert_eq!(decoded.purchased_at, cursor.purchased_at);
    }

    #[test]
    fn garbage_cursor_is_rejected() {
        assert!(matches!(
            PurchasesCursor::decode("not a cursor!"),
            Err(EngineError::InvalidCursor(_))
        ));
    }

    #[test]
    fn empty_range_is_rejected() {
        let now = Utc::now();
        let filter = PurchaseListFilter {
            from: Some(now),
            to: Some(now),
            menu_item_id: None,
        };
        assert!(matches!(
            validate_list_filter(&filter),
            Err(EngineError::InvalidRange(_))
        ));
    }

    async fn cheese_in_stock(units: i64) -> (Engine, sea_orm::DatabaseConnection, Ingredient) {
        use migration::MigratorTrait;

        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        let cheese = engine
            .new_ingredient(crate::IngredientInput::new(
                "Cheese",
                crate::Quantity::from_units(units),
                crate::Unit::Piece,
                crate::Money::new(100),
            ))
            .await
            .unwrap();
        (engine, db, cheese)
    }

    fn deduction(ingredient: &Ingredient, units: i64) -> Deduction {
        Deduction {
            ingredient_id: ingredient.id,
            ingredient_name: ingredient.name.clone(),
            amount: crate::Quantity::from_units(units),
            remaining: crate::Quantity::ZERO,
        }
    }

    #[tokio::test]
    async fn stale_deduction_is_refused_by_the_guarded_update() {
        // The plan was built when 2 were in stock; only 1 is left now.
        let (engine, db, cheese) = cheese_in_stock(1).await;

        let err = apply_deduction(&db, &deduction(&cheese, 2), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientStock("Cheese".to_string()));

        let stored = engine.ingredient(cheese.id).await.unwrap();
        assert_eq!(stored.quantity, crate::Quantity::from_units(1));
    }

    #[tokio::test]
    async fn covered_deduction_is_applied() {
        let (engine, db, cheese) = cheese_in_stock(3).await;

        apply_deduction(&db, &deduction(&cheese, 3), Utc::now())
            .await
            .unwrap();

        let stored = engine.ingredient(cheese.id).await.unwrap();
        assert_eq!(stored.quantity, crate::Quantity::ZERO);
    }
}
