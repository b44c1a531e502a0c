//! Route handlers for the food court server.
//!
//! Handlers stay thin: deserialize, call the engine API, map the result. All policy (signature verification,
//! split rules, transition legality) lives in `foodcourt_engine`; all status-code mapping lives in
//! [`crate::errors::ServerError`].
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use foodcourt_engine::{
    db_types::{GroupId, OrderNumber},
    helpers::PaymentSignature,
    CheckoutApi,
    OrderFlowApi,
    SettlementApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    data_objects::{
        CheckoutRequest,
        OrderGroupResponse,
        QuantityUpdateRequest,
        StatusUpdateRequest,
        VerifiedCheckoutResponse,
        VerifyCheckoutRequest,
    },
    errors::ServerError,
    gateway::DevGateway,
};

type Checkout = CheckoutApi<SqliteDatabase, DevGateway>;
type OrderFlow = OrderFlowApi<SqliteDatabase>;
type Settlement = SettlementApi<SqliteDatabase, DevGateway>;

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Opens a payment intent for the combined cart total. No orders are created here; they only come into existence
/// once the gateway callback passes verification.
#[post("/checkout/intent")]
pub async fn create_intent(
    req: web::Json<CheckoutRequest>,
    api: web::Data<Checkout>,
) -> Result<HttpResponse, ServerError> {
    let result = api.create_payment_intent(&req.cart).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// The gateway payment callback. Verifies the signature, materializes the sibling orders and settles the sellers,
/// all before answering. A settlement failure shows up in the `settlements` array, never as an error status;
/// a signature failure is a 403 and leaves no orders behind.
#[post("/checkout/verify")]
pub async fn verify_checkout(
    req: web::Json<VerifyCheckoutRequest>,
    api: web::Data<Checkout>,
    settlement: web::Data<Settlement>,
) -> Result<HttpResponse, ServerError> {
    let req = req.into_inner();
    let signature = PaymentSignature::new(&req.intent_id, &req.txn_id, &req.signature);
    let result = api.verify_and_materialize(&signature, &req.cart, req.fulfilment, req.group_id).await?;
    let settlements = settlement.settle_order_group(&result.orders, &req.txn_id).await;
    let response = VerifiedCheckoutResponse { orders: result.orders, group_id: result.group_id, settlements };
    Ok(HttpResponse::Ok().json(response))
}

/// The pay-later path: orders are created immediately, unpaid; the counter takes cash and marks them paid via the
/// status route.
#[post("/checkout/unpaid")]
pub async fn unpaid_checkout(
    req: web::Json<CheckoutRequest>,
    api: web::Data<Checkout>,
) -> Result<HttpResponse, ServerError> {
    let req = req.into_inner();
    let result = api.materialize_unpaid(&req.cart, req.fulfilment, req.group_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[post("/orders/{order_number}/status")]
pub async fn update_order_status(
    path: web::Path<String>,
    req: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlow>,
) -> Result<HttpResponse, ServerError> {
    let number = OrderNumber::from(path.into_inner());
    let snapshot = api.transition_status(&number, req.status).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Removing the last line cancels the order; the returned snapshot reflects that.
#[delete("/orders/{order_number}/lines/{line_id}")]
pub async fn remove_order_line(
    path: web::Path<(String, i64)>,
    api: web::Data<OrderFlow>,
) -> Result<HttpResponse, ServerError> {
    let (number, line_id) = path.into_inner();
    let number = OrderNumber::from(number);
    let snapshot = api.remove_line(&number, line_id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[patch("/orders/{order_number}/lines/{line_id}")]
pub async fn update_line_quantity(
    path: web::Path<(String, i64)>,
    req: web::Json<QuantityUpdateRequest>,
    api: web::Data<OrderFlow>,
) -> Result<HttpResponse, ServerError> {
    let (number, line_id) = path.into_inner();
    let number = OrderNumber::from(number);
    let snapshot = api.set_line_quantity(&number, line_id, req.quantity).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// The reconciliation read: every sibling order of one checkout, straight from storage. Clients that miss a
/// broadcast fetch this instead of trusting stale event state.
#[get("/orders/group/{group_id}")]
pub async fn fetch_order_group(
    path: web::Path<String>,
    api: web::Data<OrderFlow>,
) -> Result<HttpResponse, ServerError> {
    let group_id = GroupId::from(path.into_inner());
    let orders = api.fetch_by_group(&group_id).await?;
    Ok(HttpResponse::Ok().json(OrderGroupResponse { orders }))
}

#[get("/orders/{order_number}")]
pub async fn fetch_order(path: web::Path<String>, api: web::Data<OrderFlow>) -> Result<HttpResponse, ServerError> {
    let number = OrderNumber::from(path.into_inner());
    let snapshot = api.fetch_order(&number).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
