use api_types::report::{DashboardView, ProfitReportView};
use axum::{Json, extract::State};
use chrono::Utc;

use crate::{ServerError, ingredients, menu_items, purchases, server::ServerState};

/// Revenue, cost and profit of every purchase so far, at current prices.
pub async fn profit(State(state): State<ServerState>) -> Result<Json<ProfitReportView>, ServerError> {
    let report = state.engine.profit_report().await?;
    Ok(Json(ProfitReportView {
        total_revenue: report.total_revenue.to_string(),
        total_cost: report.total_cost.to_string(),
        profit: report.profit.to_string(),
    }))
}

pub async fn dashboard(State(state): State<ServerState>) -> Result<Json<DashboardView>, ServerError> {
    let dashboard = state.engine.dashboard(Utc::now()).await?;
    Ok(Json(DashboardView {
        today_purchases: dashboard.today_purchases.iter().map(purchases::view).collect(),
        low_stock: dashboard.low_stock.iter().map(ingredients::view).collect(),
        menu_items: dashboard.menu_items.iter().map(menu_items::view).collect(),
    }))
}
