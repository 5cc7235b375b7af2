use api_types::ingredient::{
    IngredientListQuery, IngredientNew, IngredientView, IngredientsResponse, LowStockQuery,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Ingredient, IngredientInput, IngredientListFilter, Money, Quantity, Unit};
use uuid::Uuid;

use crate::{ServerError, links, server::ServerState, user};

const DEFAULT_LOW_STOCK: u64 = 5;
const MAX_LOW_STOCK: u64 = 500;

pub(crate) fn view(ingredient: &Ingredient) -> IngredientView {
    IngredientView {
        url: links::ingredient(ingredient.id),
        id: ingredient.id,
        name: ingredient.name.clone(),
        quantity: ingredient.quantity.to_string(),
        unit: ingredient.unit.code().to_string(),
        unit_display: ingredient.unit_display().to_string(),
        unit_price: ingredient.unit_price.to_string(),
        created_at: ingredient.created_at,
        updated_at: ingredient.updated_at,
    }
}

fn input(payload: IngredientNew) -> Result<IngredientInput, ServerError> {
    let quantity: Quantity = payload.quantity.parse()?;
    let unit = Unit::try_from(payload.unit.as_str())?;
    let unit_price: Money = payload.unit_price.parse()?;
    Ok(IngredientInput::new(payload.name, quantity, unit, unit_price))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<IngredientListQuery>,
) -> Result<Json<IngredientsResponse>, ServerError> {
    let filter = IngredientListFilter {
        available_only: query.available.unwrap_or(false),
        search: query.search,
    };
    let ingredients = state.engine.list_ingredients(&filter).await?;
    Ok(Json(IngredientsResponse {
        ingredients: ingredients.iter().map(view).collect(),
    }))
}

pub async fn low_stock(
    State(state): State<ServerState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<IngredientsResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOW_STOCK).clamp(1, MAX_LOW_STOCK);
    let ingredients = state.engine.list_low_stock(limit).await?;
    Ok(Json(IngredientsResponse {
        ingredients: ingredients.iter().map(view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state.engine.ingredient(id).await?;
    Ok(Json(view(&ingredient)))
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<IngredientNew>,
) -> Result<(StatusCode, Json<IngredientView>), ServerError> {
    let ingredient = state.engine.new_ingredient(input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(&ingredient))))
}

pub async fn update(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientNew>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state.engine.update_ingredient(id, input(payload)?).await?;
    Ok(Json(view(&ingredient)))
}

pub async fn delete(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_ingredient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
