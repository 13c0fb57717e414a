//! Router tests for the `/expenses` API, run against the in-memory store.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tally_core::{AllData, ExceptionalPolicy, MonthData, User};
use tally_server::{AppState, create_router};
use tally_store::{FileStore, MemoryStore};
use tower::ServiceExt;

fn app_with(data: AllData) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(data));
    let state = AppState::with_options(store.clone(), ExceptionalPolicy::Drop, false);
    (create_router(state), store)
}

fn app_with_alex() -> (Router, Arc<MemoryStore>) {
    app_with(AllData {
        users: vec![User::new("alex", "pw")],
        ..Default::default()
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rent() -> Value {
    json!({"id": "1", "amount": 500.0, "description": "Rent"})
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app_with(AllData::default());
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_creates_then_verifies() {
    let (app, store) = app_with(AllData::default());
    let login = json!({"isAuth": true, "username": "alex", "password": "pw"});

    let (status, body) = call(&app, Method::POST, "/expenses", Some(login.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    assert_eq!(store.snapshot().users.len(), 1);

    let (status, body) = call(&app, Method::POST, "/expenses", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let wrong = json!({"isAuth": true, "username": "alex", "password": "nope"});
    let (status, body) = call(&app, Method::POST, "/expenses", Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_stores_hash() {
    let store = Arc::new(MemoryStore::default());
    let app = create_router(AppState::new(store.clone()));
    let login = json!({"isAuth": true, "username": "alex", "password": "pw"});

    let (status, _) = call(&app, Method::POST, "/api/expenses", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.snapshot().users[0].password.starts_with("$argon2"));
}

#[tokio::test]
async fn test_login_missing_password() {
    let (app, _) = app_with(AllData::default());
    let (status, _) = call(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({"isAuth": true, "username": "alex"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_and_get_month() {
    let (app, _) = app_with_alex();
    let jan = json!({
        "user": "alex",
        "month": "2025-01",
        "salary": 2000,
        "expenses": [],
        "fixedExpenses": [rent()]
    });

    let (status, body) = call(&app, Method::POST, "/expenses", Some(jan)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = call(&app, Method::GET, "/expenses?user=alex&month=2025-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fixedExpenses"], json!([rent()]));
}

#[tokio::test]
async fn test_new_month_inherits_defaults() {
    let (app, _) = app_with_alex();
    let jan = json!({"user": "alex", "month": "2025-01", "fixedExpenses": [rent()]});
    call(&app, Method::POST, "/expenses", Some(jan)).await;

    let feb = json!({"user": "alex", "month": "2025-02", "fixedExpenses": []});
    let (status, body) = call(&app, Method::POST, "/expenses", Some(feb)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fixedExpenses"], json!([rent()]));

    let (_, body) = call(&app, Method::GET, "/expenses?user=alex&month=2025-02", None).await;
    assert_eq!(body["fixedExpenses"], json!([rent()]));
}

#[tokio::test]
async fn test_null_lists_treated_as_new_month() {
    let (app, _) = app_with_alex();
    let jan = json!({"user": "alex", "month": "2025-01", "fixedExpenses": [rent()]});
    call(&app, Method::POST, "/expenses", Some(jan)).await;

    let feb = json!({"user": "alex", "month": "2025-02", "expenses": null, "fixedExpenses": null});
    let (status, body) = call(&app, Method::POST, "/expenses", Some(feb)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fixedExpenses"], json!([rent()]));
    assert_eq!(body["data"]["expenses"], json!([]));
}

#[tokio::test]
async fn test_exceptional_charge_not_carried_forward() {
    let (app, store) = app_with_alex();
    let jan = json!({
        "user": "alex",
        "month": "2025-01",
        "fixedExpenses": [{"id": "1", "amount": 500, "description": "Rent", "isExceptional": true}]
    });
    call(&app, Method::POST, "/expenses", Some(jan)).await;
    assert!(store.snapshot().user("alex").unwrap().defaults().is_empty());

    let feb = json!({"user": "alex", "month": "2025-02", "fixedExpenses": []});
    let (_, body) = call(&app, Method::POST, "/expenses", Some(feb)).await;
    assert_eq!(body["data"]["fixedExpenses"], json!([]));
}

#[tokio::test]
async fn test_post_twice_keeps_one_record() {
    let (app, store) = app_with_alex();
    let month = json!({
        "user": "alex",
        "month": "2025-01",
        "expenses": [{"id": "a", "amount": 12, "description": "Lunch", "category": "restaurant", "date": "2025-01-03"}],
        "fixedExpenses": [rent()]
    });
    call(&app, Method::POST, "/expenses", Some(month.clone())).await;
    call(&app, Method::POST, "/expenses", Some(month)).await;
    assert_eq!(store.snapshot().months.len(), 1);
}

#[tokio::test]
async fn test_upsert_overwrites_record() {
    let (app, _) = app_with_alex();
    let first = json!({
        "user": "alex",
        "month": "2025-01",
        "expenses": [{"id": "a", "amount": 12, "description": "Lunch", "category": "restaurant", "date": "2025-01-03"}],
        "fixedExpenses": [rent()]
    });
    let second = json!({
        "user": "alex",
        "month": "2025-01",
        "expenses": [{"id": "b", "amount": 40, "description": "Train", "category": "transport", "date": "2025-01-09"}],
        "fixedExpenses": [rent()]
    });
    call(&app, Method::POST, "/expenses", Some(first)).await;
    call(&app, Method::POST, "/expenses", Some(second)).await;

    let (_, body) = call(&app, Method::GET, "/expenses?user=alex&month=2025-01", None).await;
    let ids: Vec<_> = body["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["b"]);
}

#[tokio::test]
async fn test_save_validation() {
    let (app, _) = app_with_alex();

    let (status, body) = call(&app, Method::POST, "/expenses", Some(json!({"month": "2025-01"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user is required");

    let (status, _) = call(&app, Method::POST, "/expenses", Some(json!({"user": "alex", "month": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/expenses", Some(json!({"user": "ghost", "month": "2025-01"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body() {
    let (app, _) = app_with_alex();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/expenses")
        .body(Body::from("{oops"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user_data_hides_passwords_and_other_users() {
    let (app, _) = app_with(AllData {
        users: vec![User::new("alex", "pw"), User::new("sam", "pw2")],
        ..Default::default()
    });
    call(&app, Method::POST, "/expenses", Some(json!({"user": "alex", "month": "2025-01", "fixedExpenses": [rent()]}))).await;
    call(&app, Method::POST, "/expenses", Some(json!({"user": "sam", "month": "2025-01"}))).await;

    let (status, body) = call(&app, Method::GET, "/expenses?user=alex", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["months"].as_array().unwrap().len(), 1);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert!(body["users"][0].get("password").is_none());
    assert_eq!(body["users"][0]["defaultFixedExpenses"], json!([rent()]));

    let (status, _) = call(&app, Method::GET, "/expenses?user=nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::GET, "/expenses", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_month() {
    let (app, _) = app_with_alex();
    let (status, body) = call(&app, Method::GET, "/expenses?user=alex&month=2030-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Month not found");
}

#[tokio::test]
async fn test_get_month_of_unknown_user() {
    let (app, _) = app_with(AllData {
        months: vec![MonthData::new("ghost", "2025-01")],
        ..Default::default()
    });
    let (status, body) = call(&app, Method::GET, "/expenses?user=ghost&month=2025-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found: ghost");
}

#[tokio::test]
async fn test_legacy_document_still_serves_login() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expenses.json");
    std::fs::write(
        &path,
        r#"{"defaultFixedExpenses":[{"id":"1","amount":500,"description":"Loyer"}],"months":[{"month":"2025-01","salary":2000,"expenses":[],"fixedExpenses":[]}]}"#,
    )
    .unwrap();
    let store = Arc::new(FileStore::new(path, true));
    let app = create_router(AppState::with_options(store, ExceptionalPolicy::Drop, false));

    let login = json!({"isAuth": true, "username": "alex", "password": "pw"});
    let (status, body) = call(&app, Method::POST, "/expenses", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);

    let (status, body) = call(&app, Method::GET, "/expenses?user=alex", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["months"], json!([]));
}

#[tokio::test]
async fn test_delete_month() {
    let (app, store) = app_with_alex();
    call(&app, Method::POST, "/expenses", Some(json!({"user": "alex", "month": "2025-01"}))).await;

    let (status, _) = call(&app, Method::DELETE, "/expenses?user=alex&month=2025-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.snapshot().months.is_empty());

    let (status, _) = call(&app, Method::DELETE, "/expenses?user=alex", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_month_does_not_write() {
    let (app, store) = app_with_alex();
    let before = store.snapshot();

    let (status, _) = call(&app, Method::DELETE, "/expenses?user=alex&month=2025-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_summary() {
    let (app, _) = app_with_alex();
    let month = json!({
        "user": "alex",
        "month": "2025-01",
        "salary": 2000,
        "expenses": [
            {"id": "a", "amount": 30, "description": "Bus", "category": "transport", "date": "2025-01-02"},
            {"id": "b", "amount": 20, "description": "Taxi", "category": "transport", "date": "2025-01-05"}
        ],
        "fixedExpenses": [rent()]
    });
    call(&app, Method::POST, "/expenses", Some(month)).await;

    let (status, body) = call(&app, Method::GET, "/expenses/summary?user=alex&month=2025-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 550.0);
    assert_eq!(body["remaining"], 1450.0);
    assert_eq!(body["byCategory"]["transport"], 50.0);
}

#[tokio::test]
async fn test_categories() {
    let (app, _) = app_with(AllData::default());
    let (status, body) = call(&app, Method::GET, "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_file_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("expenses.json"), true));
    let app = create_router(AppState::with_options(store, ExceptionalPolicy::Drop, false));

    call(&app, Method::POST, "/expenses", Some(json!({"isAuth": true, "username": "sam", "password": "pw"}))).await;
    // No catalog of its own yet: the seeded legacy catalog is copied in.
    let (status, body) = call(&app, Method::POST, "/expenses", Some(json!({"user": "sam", "month": "2025-01"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fixedExpenses"].as_array().unwrap().len(), 3);

    let on_disk: AllData =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("expenses.json")).unwrap()).unwrap();
    assert_eq!(on_disk.months.len(), 1);
    assert_eq!(on_disk.revision, 2);
}
