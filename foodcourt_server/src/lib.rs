//! # Food court server
//! This module hosts the HTTP surface for the food court ordering system. It is responsible for:
//! Accepting checkout requests (pre-pay and pay-later) and handing them to the engine.
//! Receiving the payment gateway's verification callback and materializing orders from it.
//! Exposing the staff-facing order lifecycle and line mutation routes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout/intent`, `/checkout/verify`, `/checkout/unpaid`: the checkout pipeline.
//! * `/orders/{order_number}/status`, `/orders/{order_number}/lines/{line_id}`: staff order management.
//! * `/orders/group/{group_id}`, `/orders/{order_number}`: reconciliation reads.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod gateway;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
