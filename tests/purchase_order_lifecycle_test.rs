mod common;

use axum::http::{header, Method, StatusCode};
use procurement_api::models::MAX_NOTES_LENGTH;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{decimal_field, response_json, response_text, TestApp};

fn order_uri(order: &Value, suffix: &str) -> String {
    format!(
        "/api/v1/purchase-orders/{}{}",
        order["id"].as_str().expect("order id"),
        suffix
    )
}

fn item_id(order: &Value, index: usize) -> String {
    order["items"][index]["id"]
        .as_str()
        .expect("item id")
        .to_string()
}

async fn approve(app: &TestApp, order: &Value) -> Value {
    let response = app
        .request(Method::POST, &order_uri(order, "/approve"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn create_starts_in_draft_with_ordered_total() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;

    assert_eq!(order["status"], "DRAFT");
    assert_eq!(order["po_number"], "PO-000001");
    assert_eq!(decimal_field(&order["total_amount"]), dec!(60));
    assert_eq!(order["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(decimal_field(&order["items"][0]["received_quantity"]), dec!(0));
}

#[tokio::test]
async fn create_without_price_uses_average_cost() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "supplier_id": app.supplier_id,
                "branch_id": app.branch_id,
                "items": [{ "raw_material_id": app.fabric_id, "qty": "4" }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = response_json(response).await;
    assert_eq!(decimal_field(&order["items"][0]["unit_price"]), dec!(5));
    assert_eq!(decimal_field(&order["total_amount"]), dec!(20));
}

#[tokio::test]
async fn create_rejects_empty_items_and_unknown_supplier() {
    let app = TestApp::new();

    let empty = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "supplier_id": app.supplier_id,
                "branch_id": app.branch_id,
                "items": []
            })),
        )
        .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "supplier_id": Uuid::new_v4(),
                "branch_id": app.branch_id,
                "items": [{ "raw_material_id": app.fabric_id, "qty": 1, "unit_price": "1" }]
            })),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let long_notes = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "supplier_id": app.supplier_id,
                "branch_id": app.branch_id,
                "notes": "n".repeat(MAX_NOTES_LENGTH as usize + 1),
                "items": [{ "raw_material_id": app.fabric_id, "qty": 1, "unit_price": "1" }]
            })),
        )
        .await;
    assert_eq!(long_notes.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_moves_draft_to_placed_once() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;

    let placed = approve(&app, &order).await;
    assert_eq!(placed["status"], "PLACED");

    let again = app
        .request(Method::POST, &order_uri(&order, "/approve"), None)
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body = response_json(again).await;
    assert_eq!(body["code"], "invalid_state");
}

#[tokio::test]
async fn receiving_goes_partial_then_received_with_flat_tax() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    let first = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [
                    { "item_id": item_id(&order, 0), "received_quantity": 10 },
                    { "item_id": item_id(&order, 1), "received_quantity": "0" }
                ]
            })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(response_json(first).await["status"], "PARTIAL");

    let summary = response_json(
        app.request(Method::GET, &order_uri(&order, "/summary"), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&summary["ordered_total"]), dec!(60));
    assert_eq!(decimal_field(&summary["received_total"]), dec!(50));
    assert_eq!(summary["can_cancel"], false);
    assert_eq!(summary["allowed_actions"], json!(["receive"]));
    assert_eq!(summary["lines"][1]["label"], "Item 2");
    assert_eq!(decimal_field(&summary["lines"][1]["pending_quantity"]), dec!(5));

    let second = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [{ "item_id": item_id(&order, 1), "received_quantity": "5" }]
            })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    let received = response_json(second).await;
    assert_eq!(received["status"], "RECEIVED");
    assert_eq!(decimal_field(&received["items"][0]["received_quantity"]), dec!(10));

    let summary = response_json(
        app.request(Method::GET, &order_uri(&order, "/summary"), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&summary["received_total"]), dec!(61));
    assert_eq!(summary["display"]["received_total"], "USD 61.00");
    assert_eq!(summary["display"]["ordered_total"], "USD 60.00");
    assert_eq!(summary["display"]["expected_date"], "30 Jun 2024");
    assert_eq!(summary["allowed_actions"], json!([]));
}

#[tokio::test]
async fn receiving_is_rejected_outside_placed_or_partial() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;

    let response = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [{ "item_id": item_id(&order, 0), "received_quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_item_rejects_the_whole_batch() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    let response = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [
                    { "item_id": item_id(&order, 0), "received_quantity": 4 },
                    { "item_id": Uuid::new_v4(), "received_quantity": 1 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let current = response_json(app.request(Method::GET, &order_uri(&order, ""), None).await).await;
    assert_eq!(current["status"], "PLACED");
    assert_eq!(decimal_field(&current["items"][0]["received_quantity"]), dec!(0));
}

#[tokio::test]
async fn negative_and_garbage_quantities() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    let negative = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [{ "item_id": item_id(&order, 0), "received_quantity": -2 }]
            })),
        )
        .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    // Non-numeric input counts as nothing received.
    let garbage = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [{ "item_id": item_id(&order, 0), "received_quantity": "abc" }]
            })),
        )
        .await;
    assert_eq!(garbage.status(), StatusCode::OK);
    let body = response_json(garbage).await;
    assert_eq!(body["status"], "PLACED");
    assert_eq!(decimal_field(&body["items"][0]["received_quantity"]), dec!(0));
}

#[tokio::test]
async fn amounts_beyond_decimal_range_are_rejected() {
    let app = TestApp::new();

    let create = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(json!({
                "supplier_id": app.supplier_id,
                "branch_id": app.branch_id,
                "items": [{
                    "raw_material_id": app.fabric_id,
                    "qty": "1000000000000000",
                    "unit_price": "1000000000000000"
                }]
            })),
        )
        .await;
    assert_eq!(create.status(), StatusCode::BAD_REQUEST);
    let body = response_json(create).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("amount out of range"));

    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    let receive = app
        .request(
            Method::POST,
            &order_uri(&order, "/receive"),
            Some(json!({
                "items": [
                    { "item_id": item_id(&order, 1), "received_quantity": 5 },
                    { "item_id": item_id(&order, 0), "received_quantity": "79228162514264337593543950335" }
                ]
            })),
        )
        .await;
    assert_eq!(receive.status(), StatusCode::BAD_REQUEST);

    let stored = response_json(app.request(Method::GET, &order_uri(&order, ""), None).await).await;
    assert_eq!(stored["status"], "PLACED");
    assert_eq!(decimal_field(&stored["items"][0]["received_quantity"]), dec!(0));
    assert_eq!(decimal_field(&stored["items"][1]["received_quantity"]), dec!(0));

    let summary = app
        .request(Method::GET, &order_uri(&order, "/summary"), None)
        .await;
    assert_eq!(summary.status(), StatusCode::OK);
}

#[tokio::test]
async fn cancellation_requires_a_real_reason() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    let short = app
        .request(
            Method::POST,
            &order_uri(&order, "/cancel"),
            Some(json!({ "reason": "too short" })),
        )
        .await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    let ok = app
        .request(
            Method::POST,
            &order_uri(&order, "/cancel"),
            Some(json!({ "reason": "no longer needed" })),
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let cancelled = response_json(ok).await;
    assert_eq!(cancelled["status"], "CANCELLED");
    assert_eq!(cancelled["cancellation_reason"], "no longer needed");

    let again = app
        .request(
            Method::POST,
            &order_uri(&order, "/cancel"),
            Some(json!({ "reason": "no longer needed" })),
        )
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancellation_blocked_once_goods_arrived() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;
    approve(&app, &order).await;

    app.request(
        Method::POST,
        &order_uri(&order, "/receive"),
        Some(json!({
            "items": [{ "item_id": item_id(&order, 0), "received_quantity": 3 }]
        })),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            &order_uri(&order, "/cancel"),
            Some(json!({ "reason": "supplier went out of business" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn edit_replaces_draft_and_is_locked_after_approval() {
    let app = TestApp::new();
    let order = app.create_standard_order().await;

    let edit = json!({
        "supplier_id": app.supplier_id,
        "branch_id": app.branch_id,
        "expected_date": "2024-07-15",
        "items": [{ "raw_material_id": app.thread_id, "qty": 20, "unit_price": "2.25", "tax": "3" }]
    });

    let response = app
        .request(Method::PUT, &order_uri(&order, ""), Some(edit.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = response_json(response).await;
    assert_eq!(edited["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(edited["expected_date"], "2024-07-15");
    assert_eq!(decimal_field(&edited["total_amount"]), dec!(45));
    assert_ne!(edited["items"][0]["id"], order["items"][0]["id"]);

    approve(&app, &order).await;
    let locked = app
        .request(Method::PUT, &order_uri(&order, ""), Some(edit))
        .await;
    assert_eq!(locked.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_only_while_draft() {
    let app = TestApp::new();
    let draft = app.create_standard_order().await;
    let placed = app.create_standard_order().await;
    approve(&app, &placed).await;

    let refused = app
        .request(Method::DELETE, &order_uri(&placed, ""), None)
        .await;
    assert_eq!(refused.status(), StatusCode::CONFLICT);

    let deleted = app
        .request(Method::DELETE, &order_uri(&draft, ""), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app.request(Method::GET, &order_uri(&draft, ""), None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_status_and_export_is_csv() {
    let app = TestApp::new();
    app.create_standard_order().await;
    let placed = app.create_standard_order().await;
    approve(&app, &placed).await;

    let all = response_json(
        app.request(Method::GET, "/api/v1/purchase-orders", None)
            .await,
    )
    .await;
    assert_eq!(all["pagination"]["total"], 2);

    let only_placed = response_json(
        app.request(Method::GET, "/api/v1/purchase-orders?status=placed", None)
            .await,
    )
    .await;
    assert_eq!(only_placed["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(only_placed["data"][0]["po_number"], "PO-000002");

    let export = app
        .request(Method::GET, "/api/v1/purchase-orders/export", None)
        .await;
    assert_eq!(export.status(), StatusCode::OK);
    assert_eq!(
        export.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let csv = response_text(export).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("PO-000001,Northern Textiles,Main Workshop,DRAFT,"));
    assert!(lines[2].contains(",PLACED,"));
    assert!(lines[2].ends_with(",60.00,0.00"));
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/purchase-orders/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
