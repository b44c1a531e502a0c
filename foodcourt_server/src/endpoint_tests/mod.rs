mod checkout;
mod orders;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
    Error,
};
use fcs_common::Secret;
use foodcourt_engine::{
    db_types::{MenuItem, Seller},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path, seed_menu_item, seed_seller},
    CheckoutApi,
    OrderFlowApi,
    SettlementApi,
    SqliteDatabase,
};

use crate::{
    gateway::DevGateway,
    routes::{
        create_intent,
        fetch_order,
        fetch_order_group,
        health,
        remove_order_line,
        unpaid_checkout,
        update_line_quantity,
        update_order_status,
        verify_checkout,
    },
};

pub fn test_secret() -> Secret<String> {
    Secret::new("endpoint-test-secret".to_string())
}

pub struct TestSeed {
    pub db: SqliteDatabase,
    pub dosa_stand: Seller,
    pub lassi_stand: Seller,
    pub dosa: MenuItem,
    pub lassi: MenuItem,
}

/// A scratch database with two sellers, one item each: dosa at 100 and lassi at 50.
pub async fn seeded_db() -> TestSeed {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let dosa_stand = seed_seller(&db, "Dosa Corner", 0.10, Some("acct_dosa")).await;
    let lassi_stand = seed_seller(&db, "Lassi House", 0.10, Some("acct_lassi")).await;
    let dosa = seed_menu_item(&db, dosa_stand.id, "Masala Dosa", 100).await;
    let lassi = seed_menu_item(&db, lassi_stand.id, "Sweet Lassi", 50).await;
    TestSeed { db, dosa_stand, lassi_stand, dosa, lassi }
}

/// Builds the full route table against the given database, exactly as the real server wires it.
pub async fn init_app(
    db: &SqliteDatabase,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let gateway = DevGateway::new();
    let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), test_secret(), EventProducers::default());
    let order_flow_api = OrderFlowApi::new(db.clone(), EventProducers::default());
    let settlement_api = SettlementApi::new(db.clone(), gateway);
    test::init_service(
        App::new()
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(settlement_api))
            .service(health)
            .service(create_intent)
            .service(verify_checkout)
            .service(unpaid_checkout)
            .service(update_order_status)
            .service(remove_order_line)
            .service(update_line_quantity)
            .service(fetch_order_group)
            .service(fetch_order),
    )
    .await
}

pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, serde_json::Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!(String::from_utf8_lossy(&body)));
    (status, value)
}

pub fn post_json(path: &str, body: serde_json::Value) -> Request {
    TestRequest::post().uri(path).set_json(body).to_request()
}
