use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, ingredients, menu_items, users};

mod dashboard;
mod menu;
mod recipes;
mod reporting;
mod sales;
mod stock;

pub use dashboard::Dashboard;
pub use recipes::RecipeLine;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// SQLite binds `LIMIT` as a signed 64-bit integer. One row of headroom is
/// left for the look-ahead row of paged listings.
const MAX_ROWS: u64 = i64::MAX as u64 - 1;

/// Caps a caller supplied row limit to what the database can bind.
pub(crate) fn row_limit(limit: u64) -> u64 {
    limit.min(MAX_ROWS)
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// Serializes every write to ingredient quantities, so a purchase checks
    /// and deducts against a stock nobody else is changing.
    stock_lock: Arc<Mutex<()>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) async fn require_ingredient(
        &self,
        db: &DatabaseTransaction,
        ingredient_id: Uuid,
    ) -> ResultEngine<ingredients::Model> {
        ingredients::Entity::find_by_id(ingredient_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("ingredient not exists".to_string()))
    }

    pub(crate) async fn require_menu_item(
        &self,
        db: &DatabaseTransaction,
        menu_item_id: Uuid,
    ) -> ResultEngine<menu_items::Model> {
        menu_items::Entity::find_by_id(menu_item_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("menu item not exists".to_string()))
    }

    pub(crate) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {username} not exists")))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            stock_lock: Arc::new(Mutex::new(())),
        })
    }
}
