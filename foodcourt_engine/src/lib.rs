//! Food Court Engine
//!
//! The core logic for a multi-seller food court ordering system. A guest checks out a single cart; the engine
//! splits it into one order per seller, charges once for the combined total, and only materializes orders once the
//! payment callback has been cryptographically verified. It is gateway-agnostic and HTTP-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the only supported backend at present. You should never need
//!    to access the database directly. Instead, use the public API provided by the engine. The exception is the
//!    data types used in the database, which live in the public `db_types` module.
//! 2. The engine public API ([`mod@fce_api`]): checkout ([`CheckoutApi`]), the order lifecycle ([`OrderFlowApi`])
//!    and seller settlement ([`SettlementApi`]). Backends implement the traits in [`mod@traits`] to drive these.
//! 3. Events ([`mod@events`]). The engine emits an event whenever an order is created, changes status, has a line
//!    edited, or is cancelled. A simple actor framework lets you hook into these and fan them out however you
//!    like; delivery is fire-and-forget and never blocks the flow that triggered it.
pub mod db_types;
pub mod events;
pub mod fce_api;
pub mod helpers;
pub mod splitter;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use crate::{
    fce_api::{
        checkout_api::CheckoutApi,
        order_flow_api::OrderFlowApi,
        order_objects,
        settlement_api::SettlementApi,
    },
    traits::{CatalogLookup, CheckoutError, FoodCourtDatabase, GatewayError, OrderFlowError, PaymentGateway},
};
