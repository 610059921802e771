use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use itemflow::web::handlers::MALFORMED_BODY_MESSAGE;
use itemflow::{
    InMemoryItemStore, Item, ItemError, ItemStore, ProcessingConfig, Result, build_app,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with_store() -> (axum::Router, Arc<InMemoryItemStore>) {
    let store = Arc::new(InMemoryItemStore::new());
    let router = build_app(store.clone(), &ProcessingConfig::new(4)).expect("app should build");
    (router, store)
}

/// Store whose id listing is unavailable; everything else delegates.
#[derive(Default)]
struct IdListingDown {
    inner: InMemoryItemStore,
}

#[async_trait]
impl ItemStore for IdListingDown {
    async fn list_all(&self) -> Result<Vec<Item>> {
        self.inner.list_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Item>> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, item: Item) -> Result<Item> {
        self.inner.save(item).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.inner.delete_by_id(id).await
    }

    async fn list_all_ids(&self) -> Result<Vec<i64>> {
        Err(ItemError::storage("id listing unavailable"))
    }
}

async fn send_raw(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");
    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

fn valid_item(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Description",
        "status": "In Stock",
        "email": "email@test.com"
    })
}

#[tokio::test]
async fn create_and_get_item() {
    let (app, _) = app_with_store();

    let (status, created) =
        send(&app, Method::POST, "/api/items", Some(valid_item("Test Item"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);

    let (status, fetched) = send(&app, Method::GET, "/api/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Test Item");
    assert_eq!(fetched["email"], "email@test.com");
}

#[tokio::test]
async fn create_with_blank_name_returns_field_errors() {
    let (app, store) = app_with_store();

    let mut payload = valid_item("");
    payload["email"] = json!("broken");
    let (status, body) = send(&app, Method::POST, "/api/items", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation Failed");
    assert_eq!(body["details"]["name"], "name cannot be empty");
    assert_eq!(body["details"]["email"], "Invalid email format");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn create_with_missing_fields_reports_each_one() {
    let (app, _) = app_with_store();

    let (status, body) = send(&app, Method::POST, "/api/items", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["name"], "name cannot be empty");
    assert_eq!(body["details"]["description"], "description cannot be empty");
    assert_eq!(body["details"]["status"], "status cannot be empty");
    assert!(body["details"].get("email").is_none());
}

#[tokio::test]
async fn list_returns_all_items() {
    let (app, _) = app_with_store();
    for name in ["Test1", "Test2"] {
        send(&app, Method::POST, "/api/items", Some(valid_item(name))).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("list should be an array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Test1");
}

#[tokio::test]
async fn get_missing_item_returns_not_found() {
    let (app, _) = app_with_store();

    let (status, body) = send(&app, Method::GET, "/api/items/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn update_existing_item_replaces_fields() {
    let (app, _) = app_with_store();
    send(&app, Method::POST, "/api/items", Some(valid_item("Test Item"))).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/items/1",
        Some(json!({
            "id": 500,
            "name": "Test Item2",
            "description": "Description2",
            "status": "In Stock2",
            "email": "email2@test.com"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Test Item2");
    assert_eq!(body["status"], "In Stock2");
    assert_eq!(body["email"], "email2@test.com");
}

#[tokio::test]
async fn update_missing_item_returns_not_found_and_changes_nothing() {
    let (app, store) = app_with_store();
    send(&app, Method::POST, "/api/items", Some(valid_item("Original"))).await;

    let (status, _) = send(&app, Method::PUT, "/api/items/2", Some(valid_item("Other"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let original = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(original.name, "Original");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn update_with_invalid_payload_is_rejected() {
    let (app, store) = app_with_store();
    send(&app, Method::POST, "/api/items", Some(valid_item("Original"))).await;

    let mut payload = valid_item("Renamed");
    payload["status"] = json!(" ");
    let (status, body) = send(&app, Method::PUT, "/api/items/1", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["status"], "status cannot be empty");
    assert_eq!(store.find_by_id(1).await.unwrap().unwrap().name, "Original");
}

#[tokio::test]
async fn delete_then_get_returns_not_found() {
    let (app, _) = app_with_store();
    send(&app, Method::POST, "/api/items", Some(valid_item("Doomed"))).await;

    let (status, body) = send(&app, Method::DELETE, "/api/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, "/api/items/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/items/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn process_marks_every_item_processed() {
    let (app, store) = app_with_store();
    for i in 0..5 {
        let payload = valid_item(&format!("Item {i}"));
        send(&app, Method::POST, "/api/items", Some(payload)).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/items/process", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("processed list should be an array");
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|item| item["status"] == "PROCESSED"));

    let stored = store.list_all().await.unwrap();
    assert!(stored.iter().all(|item| item.status == "PROCESSED"));
}

#[tokio::test]
async fn process_with_empty_store_returns_empty_list() {
    let (app, _) = app_with_store();

    let (status, body) = send(&app, Method::GET, "/api/items/process", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_with_wrong_field_type_returns_bad_request() {
    let (app, store) = app_with_store();

    let payload = json!({
        "name": 5,
        "description": "Description",
        "status": "In Stock"
    });
    let (status, body) = send(&app, Method::POST, "/api/items", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MALFORMED_BODY_MESSAGE);
    assert!(body["details"]["body"].as_str().is_some());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn create_with_malformed_json_returns_bad_request() {
    let (app, store) = app_with_store();

    let (status, body) = send_raw(&app, Method::POST, "/api/items", "{\"name\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MALFORMED_BODY_MESSAGE);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn update_with_malformed_json_returns_bad_request() {
    let (app, store) = app_with_store();
    send(&app, Method::POST, "/api/items", Some(valid_item("Original"))).await;

    let (status, body) = send_raw(&app, Method::PUT, "/api/items/1", "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MALFORMED_BODY_MESSAGE);
    assert_eq!(store.find_by_id(1).await.unwrap().unwrap().name, "Original");
}

#[tokio::test]
async fn process_fails_with_server_error_when_ids_cannot_be_listed() {
    let store = Arc::new(IdListingDown::default());
    store
        .inner
        .save(Item::new("Kept", "Description", "NEW"))
        .await
        .unwrap();
    let app = build_app(store.clone(), &ProcessingConfig::new(2)).expect("app should build");

    let (status, body) = send(&app, Method::GET, "/api/items/process", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "storage_error");
    assert_eq!(store.inner.find_by_id(1).await.unwrap().unwrap().status, "NEW");
}
