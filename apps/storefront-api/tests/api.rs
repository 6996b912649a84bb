//! Router tests against an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use storefront_api::{router, AppState};
use storefront_core::{Manufacturer, PricingTable};
use storefront_db::{Database, DbConfig};
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

async fn setup() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    for (id, name) in [("13", "Textil Norte"), ("17", "Confecciones Centro")] {
        db.manufacturers()
            .insert(&Manufacturer {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await
            .unwrap();
    }

    let app = router(AppState::new(db.clone(), PricingTable::builtin()), BODY_LIMIT);
    (app, db)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
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

async fn create_variant_product(app: &Router, stock: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/products",
        Some(json!({
            "description": "Remera lisa",
            "manufacturerId": "17",
            "cost": "100",
            "variations": [
                { "color": "Rojo", "size": "M", "stock": stock },
                { "color": "Azul", "size": "M", "stock": 4 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_health_reports_closed_store() {
    let (app, db) = setup().await;
    db.close().await;

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], false);
}

#[tokio::test]
async fn test_list_manufacturers() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "GET", "/api/manufacturers", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["name"], "Confecciones Centro");
}

#[tokio::test]
async fn test_create_product_derives_prices() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({
            "articleCode": "ART-1",
            "description": "Buzo canguro",
            "manufacturerId": "13",
            "cost": 100,
            "stock": 7,
            "dozenPriceCents": 1
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    // rule A: base 100 * 0.75 * 1.12 = 84.00
    assert_eq!(body["dozenPriceCents"], 10584);
    assert_eq!(body["offerPriceCents"], 1085);
    assert_eq!(body["costCents"], 10000);
    assert_eq!(body["stock"], 7);
    assert_eq!(body["manufacturerName"], "Textil Norte");

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["dozenPriceCents"], 10584);
}

#[tokio::test]
async fn test_create_product_rejects_bad_input() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "description": "Remera", "manufacturerId": "13", "cost": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PRICE_NOT_COMPUTABLE");

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "description": "Remera", "manufacturerId": "99", "cost": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "description": "", "manufacturerId": "13", "cost": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let (app, _db) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/purchase")
        .header("content-type", "application/json")
        .body(Body::from("{\"items\": ["))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_over_limit() {
    let (app, _db) = setup().await;

    let description = "x".repeat(BODY_LIMIT + 1);
    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "description": description, "manufacturerId": "13", "cost": "10" })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_get_unknown_product() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "GET", "/api/products/does-not-exist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_purchase_then_sold_out() {
    let (app, _db) = setup().await;
    let id = create_variant_product(&app, 5).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/purchase",
        Some(json!({ "items": [
            { "productId": id, "quantity": 5, "color": "Rojo", "size": "M", "unitPrice": 12.5 }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["linesApplied"], 1);
    assert_eq!(body["unitsDecremented"], 5);

    let (status, body) = send(
        &app,
        "POST",
        "/api/purchase",
        Some(json!({ "items": [
            { "productId": id, "quantity": 1, "color": "Rojo", "size": "M" }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["reason"], "INSUFFICIENT");
    assert_eq!(body["productId"], id.as_str());
    assert_eq!(body["color"], "Rojo");
    assert_eq!(body["size"], "M");
    assert_eq!(body["requested"], 1);
    assert_eq!(body["available"], 0);
    assert_eq!(body["lineIndex"], 0);
    assert!(body["message"].is_string());

    let (_, product) = send(&app, "GET", &format!("/api/products/{id}"), None).await;
    let rojo = product["variations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["color"] == "Rojo")
        .unwrap();
    assert_eq!(rojo["stock"], 0);
    assert_eq!(product["stock"], 4);
}

#[tokio::test]
async fn test_failed_line_rolls_back_cart() {
    let (app, _db) = setup().await;
    let id = create_variant_product(&app, 2).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/purchase",
        Some(json!({ "items": [
            { "productId": id, "quantity": 1, "color": "Azul", "size": "M" },
            { "productId": id, "quantity": 3, "color": "Rojo", "size": "M" }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["lineIndex"], 1);

    let (_, product) = send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(product["stock"], 6);
}

#[tokio::test]
async fn test_purchase_validation() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "POST", "/api/purchase", Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        "POST",
        "/api/purchase",
        Some(json!({ "items": [{ "productId": "p", "quantity": 0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_on_closed_store() {
    let (app, db) = setup().await;
    db.close().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/purchase",
        Some(json!({ "items": [{ "productId": "p", "quantity": 1 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_offers_filter_and_pagination() {
    let (app, _db) = setup().await;

    for n in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({
                "description": format!("Producto {n}"),
                "manufacturerId": "13",
                "cost": "10.50",
                "isOnOffer": n == 1,
                "stock": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, "GET", "/api/products?page=1&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["products"].as_array().unwrap().len(), 2);

    let (_, offers) = send(&app, "GET", "/api/products?type=offers", None).await;
    assert_eq!(offers["total"], 1);
    assert_eq!(offers["products"][0]["description"], "Producto 1");
}

#[tokio::test]
async fn test_update_and_delete() {
    let (app, _db) = setup().await;
    let id = create_variant_product(&app, 5).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/products/{id}"),
        Some(json!({
            "description": "Remera lisa v2",
            "manufacturerId": "13",
            "cost": "100",
            "variations": [{ "color": "Verde", "size": "L", "stock": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dozenPriceCents"], 10584);
    assert_eq!(body["stock"], 2);
    assert_eq!(body["variations"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
