use api_types::menu_item::{MenuItemListQuery, MenuItemNew, MenuItemView, MenuItemsResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{MenuItem, MenuItemInput, Money};
use uuid::Uuid;

use crate::{ServerError, links, server::ServerState, user};

pub(crate) fn view(item: &MenuItem) -> MenuItemView {
    MenuItemView {
        url: links::menu_item(item.id),
        id: item.id,
        name: item.name.clone(),
        price: item.price.to_string(),
        image_url: item.image_url.clone(),
        recipe: links::menu_item_recipe(item.id),
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

fn input(payload: MenuItemNew) -> Result<MenuItemInput, ServerError> {
    let price: Money = payload.price.parse()?;
    let mut input = MenuItemInput::new(payload.name, price);
    if let Some(url) = payload.image_url {
        input = input.image_url(url);
    }
    Ok(input)
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MenuItemListQuery>,
) -> Result<Json<MenuItemsResponse>, ServerError> {
    let items = state.engine.list_menu_items(query.search.as_deref()).await?;
    Ok(Json(MenuItemsResponse {
        menu_items: items.iter().map(view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MenuItemView>, ServerError> {
    let item = state.engine.menu_item(id).await?;
    Ok(Json(view(&item)))
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemNew>,
) -> Result<(StatusCode, Json<MenuItemView>), ServerError> {
    let item = state.engine.new_menu_item(input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(&item))))
}

pub async fn update(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemNew>,
) -> Result<Json<MenuItemView>, ServerError> {
    let item = state.engine.update_menu_item(id, input(payload)?).await?;
    Ok(Json(view(&item)))
}

/// Removes the item and its recipe; recorded purchases are kept.
pub async fn delete(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_menu_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
