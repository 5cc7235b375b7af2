use api_types::purchase::{PurchaseListQuery, PurchaseNew, PurchaseView, PurchasesResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Purchase, PurchaseListFilter};
use uuid::Uuid;

use crate::{ServerError, links, server::ServerState, user};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

pub(crate) fn view(purchase: &Purchase) -> PurchaseView {
    PurchaseView {
        url: links::purchase(purchase.id),
        id: purchase.id,
        menu_item: links::menu_item(purchase.menu_item_id),
        quantity: purchase.quantity,
        purchased_at: purchase.purchased_at,
        logged_by: purchase.logged_by.clone(),
    }
}

/// Newest first. Follow `next_cursor` for older pages.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PurchaseListQuery>,
) -> Result<Json<PurchasesResponse>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let menu_item_id = query
        .menu_item
        .as_deref()
        .map(|reference| links::parse_ref(reference, links::MENU_ITEMS, "menu item"))
        .transpose()?;
    let filter = PurchaseListFilter {
        from: query.from,
        to: query.to,
        menu_item_id,
    };

    let (purchases, next_cursor) = state
        .engine
        .list_purchases_page(limit, query.cursor.as_deref(), &filter)
        .await?;
    Ok(Json(PurchasesResponse {
        purchases: purchases.iter().map(view).collect(),
        next_cursor,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseView>, ServerError> {
    let purchase = state.engine.purchase(id).await?;
    Ok(Json(view(&purchase)))
}

/// Logs a sale by the authenticated user and deducts its recipe from stock.
///
/// Answers 409 with the short ingredient when stock does not cover it.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseNew>,
) -> Result<(StatusCode, Json<PurchaseView>), ServerError> {
    let menu_item_id = links::parse_ref(&payload.menu_item, links::MENU_ITEMS, "menu item")?;
    let purchase = state
        .engine
        .create_purchase(menu_item_id, payload.quantity, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(view(&purchase))))
}
