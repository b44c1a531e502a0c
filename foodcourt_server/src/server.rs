use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use foodcourt_engine::{
    events::{EventHandlers, EventHooks, EventProducers, ALL_SELLERS_CHANNEL},
    CheckoutApi,
    OrderFlowApi,
    SettlementApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
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

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = start_event_handlers(config.event_buffer_size).await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Starts the broadcast side of the engine: one handler task per event type, each logging the event on its
/// channels. Every event also goes to the all-sellers firehose the dashboards watch. A real-time transport
/// (websockets, SSE) would subscribe here instead.
async fn start_event_handlers(buffer_size: usize) -> EventProducers {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        Box::pin(async move {
            info!(
                "📡️ [{ALL_SELLERS_CHANNEL}] [{}] [{}] New order {} for {}",
                ev.seller_channel(),
                ev.customer_channel(),
                ev.order.order.order_number,
                ev.order.order.total
            );
        })
    });
    hooks.on_order_status_changed(|ev| {
        Box::pin(async move {
            info!(
                "📡️ [{ALL_SELLERS_CHANNEL}] [{}] [{}] Order {} is now {}",
                ev.seller_channel(),
                ev.customer_channel(),
                ev.order_number,
                ev.status
            );
        })
    });
    hooks.on_order_line_changed(|ev| {
        Box::pin(async move {
            info!(
                "📡️ [{ALL_SELLERS_CHANNEL}] [{}] [{}] Order {} lines changed. New total: {}",
                ev.seller_channel(),
                ev.customer_channel(),
                ev.order_number,
                ev.order.order.total
            );
        })
    });
    hooks.on_order_cancelled(|ev| {
        Box::pin(async move {
            info!(
                "📡️ [{ALL_SELLERS_CHANNEL}] [{}] [{}] Order {} was cancelled",
                ev.seller_channel(),
                ev.customer_channel(),
                ev.order_number
            );
        })
    });
    let handlers = EventHandlers::new(buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    producers
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let gateway = DevGateway::new();
        let checkout_api =
            CheckoutApi::new(db.clone(), gateway.clone(), config.payment_hmac_secret.clone(), producers.clone());
        let order_flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let settlement_api = SettlementApi::new(db.clone(), gateway);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fcs::access_log"))
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
            // Registered before the catch-all order number route so "group" is not read as an order number.
            .service(fetch_order_group)
            .service(fetch_order)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
