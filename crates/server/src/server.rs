use axum::{
    Json, Router,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{ingredients, links, menu_items, purchases, recipe_requirements, report, user};
use api_types::ApiIndex;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Reads are open to anyone; every other method needs Basic credentials of
/// a known user, which is then handed to the handler as an `Extension`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = user::authenticate(&state.db, credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn index() -> Json<ApiIndex> {
    Json(ApiIndex {
        ingredients: links::INGREDIENTS.to_string(),
        menu_items: links::MENU_ITEMS.to_string(),
        recipe_requirements: links::RECIPE_REQUIREMENTS.to_string(),
        purchases: links::PURCHASES.to_string(),
        report: links::REPORT.to_string(),
        dashboard: links::DASHBOARD.to_string(),
    })
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(links::API, get(index))
        .route(
            links::INGREDIENTS,
            get(ingredients::list).post(ingredients::create),
        )
        .route("/api/ingredients/low-stock", get(ingredients::low_stock))
        .route(
            "/api/ingredients/{id}",
            get(ingredients::get)
                .put(ingredients::update)
                .delete(ingredients::delete),
        )
        .route(
            links::MENU_ITEMS,
            get(menu_items::list).post(menu_items::create),
        )
        .route(
            "/api/menu-items/{id}",
            get(menu_items::get)
                .put(menu_items::update)
                .delete(menu_items::delete),
        )
        .route(
            links::RECIPE_REQUIREMENTS,
            get(recipe_requirements::list).post(recipe_requirements::create),
        )
        .route(
            "/api/recipe-requirements/{id}",
            get(recipe_requirements::get)
                .put(recipe_requirements::update)
                .delete(recipe_requirements::delete),
        )
        .route(
            links::PURCHASES,
            get(purchases::list).post(purchases::create),
        )
        .route("/api/purchases/{id}", get(purchases::get))
        .route(links::REPORT, get(report::profit))
        .route(links::DASHBOARD, get(report::dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
