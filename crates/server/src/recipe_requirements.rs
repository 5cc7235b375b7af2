use api_types::recipe::{
    RecipeListQuery, RecipeRequirementNew, RecipeRequirementView, RecipeRequirementsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Quantity, RecipeLine, RecipeRequirementInput};
use uuid::Uuid;

use crate::{ServerError, links, server::ServerState, user};

fn view(line: &RecipeLine) -> RecipeRequirementView {
    let requirement = &line.requirement;
    RecipeRequirementView {
        url: links::recipe_requirement(requirement.id),
        id: requirement.id,
        menu_item: links::menu_item(requirement.menu_item_id),
        ingredient: links::ingredient(requirement.ingredient_id),
        quantity: requirement.quantity.to_string(),
        description: line.description(),
    }
}

fn input(payload: RecipeRequirementNew) -> Result<RecipeRequirementInput, ServerError> {
    let menu_item_id = links::parse_ref(&payload.menu_item, links::MENU_ITEMS, "menu item")?;
    let ingredient_id = links::parse_ref(&payload.ingredient, links::INGREDIENTS, "ingredient")?;
    let quantity: Quantity = payload.quantity.parse()?;
    Ok(RecipeRequirementInput::new(
        menu_item_id,
        ingredient_id,
        quantity,
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<RecipeRequirementsResponse>, ServerError> {
    let lines = match query.menu_item.as_deref() {
        Some(reference) => {
            let menu_item_id = links::parse_ref(reference, links::MENU_ITEMS, "menu item")?;
            state.engine.menu_item_recipe(menu_item_id).await?
        }
        None => state.engine.list_recipe_requirements(None).await?,
    };
    Ok(Json(RecipeRequirementsResponse {
        recipe_requirements: lines.iter().map(view).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeRequirementView>, ServerError> {
    let line = state.engine.recipe_requirement(id).await?;
    Ok(Json(view(&line)))
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecipeRequirementNew>,
) -> Result<(StatusCode, Json<RecipeRequirementView>), ServerError> {
    let line = state.engine.new_recipe_requirement(input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(&line))))
}

pub async fn update(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeRequirementNew>,
) -> Result<Json<RecipeRequirementView>, ServerError> {
    let line = state
        .engine
        .update_recipe_requirement(id, input(payload)?)
        .await?;
    Ok(Json(view(&line)))
}

pub async fn delete(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_recipe_requirement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
