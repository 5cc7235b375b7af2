use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerState, router};

async fn state() -> ServerState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "secret".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    ServerState {
        engine: Arc::new(engine),
        db,
    }
}

fn basic(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

async fn call(
    app: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(state: &ServerState, uri: &str, body: Value) -> Value {
    let auth = basic("alice", "secret");
    let (status, value) = call(router(state.clone()), Method::POST, uri, Some(&auth), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value
}

/// Bun and Patty in stock, Burger = 2 buns + 1 patty. Returns the burger url.
async fn burger(state: &ServerState) -> String {
    let bun = create(
        state,
        "/api/ingredients",
        json!({"name": "Bun", "quantity": "10", "unit": "pcs", "unit_price": "0.50"}),
    )
    .await;
    let patty = create(
        state,
        "/api/ingredients",
        json!({"name": "Patty", "quantity": "5", "unit": "pcs", "unit_price": "2.00"}),
    )
    .await;
    let burger = create(
        state,
        "/api/menu-items",
        json!({"name": "Burger", "price": "10.00"}),
    )
    .await;
    let burger_url = burger["url"].as_str().unwrap().to_string();

    create(
        state,
        "/api/recipe-requirements",
        json!({"menu_item": burger_url, "ingredient": bun["url"], "quantity": "2"}),
    )
    .await;
    // Bare ids are accepted too.
    create(
        state,
        "/api/recipe-requirements",
        json!({"menu_item": burger["id"], "ingredient": patty["id"], "quantity": "1"}),
    )
    .await;
    burger_url
}

#[tokio::test]
async fn index_lists_collections() {
    let state = state().await;
    let (status, body) = call(router(state), Method::GET, "/api", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"], "/api/ingredients");
    assert_eq!(body["report"], "/api/report");
}

#[tokio::test]
async fn writes_need_credentials() {
    let state = state().await;
    let body = json!({"name": "Salt", "quantity": "1", "unit": "g", "unit_price": "0.01"});

    let (status, _) = call(
        router(state.clone()),
        Method::POST,
        "/api/ingredients",
        None,
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = basic("alice", "secre");
    let (status, _) = call(
        router(state.clone()),
        Method::POST,
        "/api/ingredients",
        Some(&wrong),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay open.
    let (status, body) = call(router(state), Method::GET, "/api/ingredients", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"], json!([]));
}

#[tokio::test]
async fn purchase_flow_and_report() {
    let state = state().await;
    let burger_url = burger(&state).await;

    let purchase = create(
        &state,
        "/api/purchases",
        json!({"menu_item": burger_url, "quantity": 3}),
    )
    .await;
    assert_eq!(purchase["logged_by"], "alice");
    assert_eq!(purchase["menu_item"], burger_url);

    let (status, body) = call(
        router(state.clone()),
        Method::GET,
        "/api/ingredients",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quantities: Vec<_> = body["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| (i["name"].as_str().unwrap(), i["quantity"].as_str().unwrap()))
        .collect();
    assert_eq!(quantities, vec![("Bun", "4"), ("Patty", "2")]);

    let (status, report) = call(router(state.clone()), Method::GET, "/api/report", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report,
        json!({"total_revenue": "30.00", "total_cost": "9.00", "profit": "21.00"})
    );

    let purchase_url = purchase["url"].as_str().unwrap();
    let (status, body) = call(router(state.clone()), Method::GET, purchase_url, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 3);

    let (status, body) = call(router(state), Method::GET, "/api/purchases", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
    assert_eq!(body["next_cursor"], Value::Null);
}

#[tokio::test]
async fn insufficient_stock_is_a_conflict() {
    let state = state().await;
    let burger_url = burger(&state).await;
    let auth = basic("alice", "secret");

    let (status, body) = call(
        router(state.clone()),
        Method::POST,
        "/api/purchases",
        Some(&auth),
        Some(json!({"menu_item": burger_url, "quantity": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().starts_with("Not enough"));

    let (_, body) = call(router(state.clone()), Method::GET, "/api/purchases", None, None).await;
    assert_eq!(body["purchases"], json!([]));

    let (status, _) = call(
        router(state),
        Method::POST,
        "/api/purchases",
        Some(&auth),
        Some(json!({"menu_item": burger_url, "quantity": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn validation_errors_are_422() {
    let state = state().await;
    let auth = basic("alice", "secret");

    for body in [
        json!({"name": "Salt", "quantity": "-1", "unit": "g", "unit_price": "0.01"}),
        json!({"name": "Salt", "quantity": "1", "unit": "bushel", "unit_price": "0.01"}),
        json!({"name": "", "quantity": "1", "unit": "g", "unit_price": "0.01"}),
        json!({"name": "Salt", "quantity": "1", "unit": "g", "unit_price": "0.001"}),
    ] {
        let (status, value) = call(
            router(state.clone()),
            Method::POST,
            "/api/ingredients",
            Some(&auth),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{value}");
        assert!(value["error"].is_string());
    }
}

#[tokio::test]
async fn egg_display_and_low_stock() {
    let state = state().await;
    let egg = create(
        &state,
        "/api/ingredients",
        json!({"name": "Egg", "quantity": "1", "unit": "egg", "unit_price": "0.25"}),
    )
    .await;
    assert_eq!(egg["unit_display"], "egg");
    create(
        &state,
        "/api/ingredients",
        json!({"name": "Milk", "quantity": "0.5", "unit": "l", "unit_price": "1.20"}),
    )
    .await;

    let auth = basic("alice", "secret");
    let (status, eggs) = call(
        router(state.clone()),
        Method::PUT,
        egg["url"].as_str().unwrap(),
        Some(&auth),
        Some(json!({"name": "Egg", "quantity": "12", "unit": "egg", "unit_price": "0.25"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(eggs["unit_display"], "eggs");

    let (status, body) = call(
        router(state),
        Method::GET,
        "/api/ingredients/low-stock?limit=1",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Milk"]);
}

#[tokio::test]
async fn huge_limits_are_clamped() {
    let state = state().await;
    burger(&state).await;

    let (status, body) = call(
        router(state.clone()),
        Method::GET,
        "/api/ingredients/low-stock?limit=18446744073709551615",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        router(state),
        Method::GET,
        "/api/purchases?limit=18446744073709551615",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchases"], json!([]));
}

#[tokio::test]
async fn deleting_menu_item_removes_recipe_only() {
    let state = state().await;
    let burger_url = burger(&state).await;
    create(
        &state,
        "/api/purchases",
        json!({"menu_item": burger_url, "quantity": 1}),
    )
    .await;

    let auth = basic("alice", "secret");
    let (status, _) = call(
        router(state.clone()),
        Method::DELETE,
        &burger_url,
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(router(state.clone()), Method::GET, &burger_url, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(
        router(state.clone()),
        Method::GET,
        "/api/recipe-requirements",
        None,
        None,
    )
    .await;
    assert_eq!(body["recipe_requirements"], json!([]));

    let (_, body) = call(router(state.clone()), Method::GET, "/api/ingredients", None, None).await;
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);

    let (_, body) = call(router(state), Method::GET, "/api/purchases", None, None).await;
    assert_eq!(body["purchases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn recipe_listing_per_menu_item() {
    let state = state().await;
    let burger_url = burger(&state).await;
    let uri = format!("/api/recipe-requirements?menu_item={}", burger_url.rsplit('/').next().unwrap());

    let (status, body) = call(router(state.clone()), Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let descriptions: Vec<_> = body["recipe_requirements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        descriptions,
        vec!["2 pcs of Bun for Burger", "1 pcs of Patty for Burger"]
    );

    let (status, _) = call(
        router(state),
        Method::GET,
        "/api/recipe-requirements?menu_item=nope",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn dashboard_collects_today() {
    let state = state().await;
    let burger_url = burger(&state).await;
    create(
        &state,
        "/api/purchases",
        json!({"menu_item": burger_url, "quantity": 2}),
    )
    .await;

    let (status, body) = call(router(state), Method::GET, "/api/dashboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today_purchases"].as_array().unwrap().len(), 1);
    assert_eq!(body["low_stock"][0]["name"], "Patty");
    assert_eq!(body["menu_items"][0]["name"], "Burger");
    assert_eq!(body["menu_items"][0]["price"], "10.00");
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let ServerState { engine, db } = state().await;
    let engine = Arc::try_unwrap(engine).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, db, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("/api/purchases"));
}
