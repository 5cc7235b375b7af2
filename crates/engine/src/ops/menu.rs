use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MenuItem, MenuItemInput, ResultEngine, menu_items, recipe_requirements,
    util::{name_key, normalize_image_url, normalize_required_name},
};

use super::{Engine, with_tx};

struct ValidMenuItem {
    name: String,
    image_url: Option<String>,
}

fn validate_menu_item(input: &MenuItemInput) -> ResultEngine<ValidMenuItem> {
    let name = normalize_required_name(&input.name, "menu item")?;
    input.price.ensure_price("price")?;
    let image_url = normalize_image_url(input.image_url.as_deref())?;
    Ok(ValidMenuItem { name, image_url })
}

impl Engine {
    /// Adds a product to the menu. Its recipe starts empty.
    pub async fn new_menu_item(&self, input: MenuItemInput) -> ResultEngine<MenuItem> {
        let valid = validate_menu_item(&input)?;
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4(),
            name: valid.name,
            price: input.price,
            image_url: valid.image_url,
            created_at: now,
            updated_at: now,
        };

        with_tx!(self, |db_tx| {
            let model: menu_items::ActiveModel = (&item).into();
            model.insert(&db_tx).await?;
            Ok(item)
        })
    }

    pub async fn menu_item(&self, menu_item_id: Uuid) -> ResultEngine<MenuItem> {
        with_tx!(self, |db_tx| {
            let model = self.require_menu_item(&db_tx, menu_item_id).await?;
            MenuItem::try_from(model)
        })
    }

    /// Menu items ordered by name, optionally narrowed by a name search.
    pub async fn list_menu_items(&self, search: Option<&str>) -> ResultEngine<Vec<MenuItem>> {
        with_tx!(self, |db_tx| {
            let mut query = menu_items::Entity::find();
            if let Some(search) = search.map(name_key)
                && !search.is_empty()
            {
                query = query.filter(menu_items::Column::NameNorm.contains(search));
            }
            let models = query
                .order_by_asc(menu_items::Column::NameNorm)
                .order_by_asc(menu_items::Column::Id)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(MenuItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn update_menu_item(
        &self,
        menu_item_id: Uuid,
        input: MenuItemInput,
    ) -> ResultEngine<MenuItem> {
        let valid = validate_menu_item(&input)?;
        with_tx!(self, |db_tx| {
            let current = self.require_menu_item(&db_tx, menu_item_id).await?;
            let active = menu_items::ActiveModel {
                id: ActiveValue::Set(current.id),
                name_norm: ActiveValue::Set(name_key(&valid.name)),
                name: ActiveValue::Set(valid.name),
                price_minor: ActiveValue::Set(input.price.cents()),
                image_url: ActiveValue::Set(valid.image_url),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            MenuItem::try_from(model)
        })
    }

    /// Deletes a menu item and its recipe. Past purchases keep the stored id.
    pub async fn delete_menu_item(&self, menu_item_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_menu_item(&db_tx, menu_item_id).await?;
            recipe_requirements::Entity::delete_many()
                .filter(recipe_requirements::Column::MenuItemId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            let res = menu_items::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            if res.rows_affected != 1 {
                return Err(EngineError::KeyNotFound("menu item not exists".to_string()));
            }
            Ok(())
        })
    }
}
