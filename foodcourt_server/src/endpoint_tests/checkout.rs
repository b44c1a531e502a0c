use actix_web::{http::StatusCode, test::TestRequest};
use foodcourt_engine::helpers::sign_payment;
use serde_json::json;

use super::{init_app, post_json, seeded_db, send, test_secret};

#[actix_web::test]
async fn health_check() {
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let (status, _) = send(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn intent_creation_returns_the_combined_amount() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let cart = json!({ "cart": [
        { "menu_item_id": seed.dosa.id, "quantity": 2, "note": null },
        { "menu_item_id": seed.lassi.id, "quantity": 1, "note": null }
    ]});
    let (status, body) = send(&app, post_json("/checkout/intent", cart)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 308);
    assert_eq!(body["currency"], "INR");
    assert!(body["intent_id"].as_str().unwrap().starts_with("pi_dev_"));
}

#[actix_web::test]
async fn empty_cart_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let (status, body) = send(&app, post_json("/checkout/intent", json!({ "cart": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The cart is empty");
}

#[actix_web::test]
async fn forged_callback_is_forbidden_and_creates_nothing() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let cart = json!([{ "menu_item_id": seed.dosa.id, "quantity": 2, "note": null }]);
    let (_, intent) = send(&app, post_json("/checkout/intent", json!({ "cart": cart }))).await;
    let intent_id = intent["intent_id"].as_str().unwrap();

    let verify = json!({
        "intent_id": intent_id,
        "txn_id": "txn_ep_1",
        "signature": "deadbeef",
        "cart": cart,
        "fulfilment": "DineIn"
    });
    let (status, body) = send(&app, post_json("/checkout/verify", verify)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Payment verification failed");
}

#[actix_web::test]
async fn verified_checkout_returns_orders_and_settlements() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let cart = json!([
        { "menu_item_id": seed.dosa.id, "quantity": 2, "note": null },
        { "menu_item_id": seed.lassi.id, "quantity": 1, "note": "less sugar" }
    ]);
    let (_, intent) = send(&app, post_json("/checkout/intent", json!({ "cart": cart }))).await;
    let intent_id = intent["intent_id"].as_str().unwrap();
    let signature = sign_payment(intent_id, "txn_ep_2", &test_secret());

    let verify = json!({
        "intent_id": intent_id,
        "txn_id": "txn_ep_2",
        "signature": signature,
        "cart": cart,
        "fulfilment": "Takeaway"
    });
    let (status, body) = send(&app, post_json("/checkout/verify", verify)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
    assert!(body["group_id"].is_string());
    let settlements = body["settlements"].as_array().unwrap();
    assert_eq!(settlements.len(), 2);
    assert!(settlements.iter().all(|s| s["transfer_status"] == "Success"));
    let statuses: Vec<&str> =
        body["orders"].as_array().unwrap().iter().map(|o| o["order"]["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["Paid", "Paid"]);
}

#[actix_web::test]
async fn unpaid_checkout_materializes_pending_orders() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let body = json!({
        "cart": [{ "menu_item_id": seed.lassi.id, "quantity": 2, "note": null }],
        "fulfilment": "DineIn"
    });
    let (status, body) = send(&app, post_json("/checkout/unpaid", body)).await;
    assert_eq!(status, StatusCode::OK);
    let order = &body["orders"][0]["order"];
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["payment_status"], "Unpaid");
    assert_eq!(order["payment_method"], "Cash");
    assert!(body["group_id"].is_null());
}

#[actix_web::test]
async fn unknown_items_are_rejected() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let body = json!({ "cart": [{ "menu_item_id": 999_999, "quantity": 1, "note": null }] });
    let (status, _) = send(&app, post_json("/checkout/intent", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
