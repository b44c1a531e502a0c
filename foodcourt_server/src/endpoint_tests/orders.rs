use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test::TestRequest,
    Error,
};
use serde_json::json;

use super::{init_app, post_json, seeded_db, send, TestSeed};

async fn place_unpaid_order<S, B>(app: &S, seed: &TestSeed) -> serde_json::Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let body = json!({
        "cart": [
            { "menu_item_id": seed.dosa.id, "quantity": 2, "note": null },
            { "menu_item_id": seed.lassi.id, "quantity": 1, "note": null }
        ],
        "fulfilment": "DineIn"
    });
    let (status, body) = send(app, post_json("/checkout/unpaid", body)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[actix_web::test]
async fn staff_walk_an_order_through_its_lifecycle() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let placed = place_unpaid_order(&app, &seed).await;
    let number = placed["orders"][0]["order"]["order_number"].as_str().unwrap().to_string();

    for status in ["Paid", "Preparing", "Ready", "Served"] {
        let (code, body) =
            send(&app, post_json(&format!("/orders/{number}/status"), json!({ "status": status }))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["order"]["status"], status);
    }
}

#[actix_web::test]
async fn illegal_transitions_are_conflicts() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let placed = place_unpaid_order(&app, &seed).await;
    let number = placed["orders"][0]["order"]["order_number"].as_str().unwrap().to_string();

    let (code, body) = send(&app, post_json(&format!("/orders/{number}/status"), json!({ "status": "Served" }))).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Illegal status transition"));
}

#[actix_web::test]
async fn unknown_orders_are_not_found() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let (code, _) = send(&app, post_json("/orders/FC-0-ZZZZ/status", json!({ "status": "Paid" }))).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    let (code, _) = send(&app, TestRequest::get().uri("/orders/FC-0-ZZZZ").to_request()).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn line_removal_updates_totals_and_can_cancel() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let placed = place_unpaid_order(&app, &seed).await;
    // The dosa order: one line of 2 x 100
    let dosa_order = placed["orders"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["order"]["seller_id"] == seed.dosa_stand.id)
        .unwrap();
    let number = dosa_order["order"]["order_number"].as_str().unwrap();
    let line_id = dosa_order["lines"][0]["id"].as_i64().unwrap();

    let req = TestRequest::delete().uri(&format!("/orders/{number}/lines/{line_id}")).to_request();
    let (code, body) = send(&app, req).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Cancelled");
    assert_eq!(body["lines"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn quantity_changes_recompute_the_totals() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let placed = place_unpaid_order(&app, &seed).await;
    let dosa_order = placed["orders"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["order"]["seller_id"] == seed.dosa_stand.id)
        .unwrap();
    let number = dosa_order["order"]["order_number"].as_str().unwrap();
    let line_id = dosa_order["lines"][0]["id"].as_i64().unwrap();
    assert_eq!(dosa_order["order"]["total"], 246);

    let req = TestRequest::patch()
        .uri(&format!("/orders/{number}/lines/{line_id}"))
        .set_json(json!({ "quantity": 1 }))
        .to_request();
    let (code, body) = send(&app, req).await;
    assert_eq!(code, StatusCode::OK);
    // 100 + 5 + 18
    assert_eq!(body["order"]["subtotal"], 100);
    assert_eq!(body["order"]["total"], 123);

    let req = TestRequest::patch()
        .uri(&format!("/orders/{number}/lines/{line_id}"))
        .set_json(json!({ "quantity": 0 }))
        .to_request();
    let (code, _) = send(&app, req).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn group_fetch_returns_every_sibling() {
    let _ = env_logger::try_init().ok();
    let seed = seeded_db().await;
    let app = init_app(&seed.db).await;
    let placed = place_unpaid_order(&app, &seed).await;
    let group_id = placed["group_id"].as_str().unwrap();

    let (code, body) = send(&app, TestRequest::get().uri(&format!("/orders/group/{group_id}")).to_request()).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}
