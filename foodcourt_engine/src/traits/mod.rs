//! The trait seams of the food court engine.
//!
//! Business logic in [`crate::fce_api`] is written against these traits rather than concrete backends:
//! * [`FoodCourtDatabase`] — durable storage for intents, orders and settlement bookkeeping,
//! * [`CatalogLookup`] — menu item and seller resolution,
//! * [`PaymentGateway`] — the abstract external payment/transfer capability.
//!
//! The SQLite backend in [`crate::sqlite`] implements the first two; the gateway is provided by the server (or a
//! test double).

mod catalog;
mod data_objects;
mod food_court_database;
mod payment_gateway;

pub use catalog::{CatalogError, CatalogLookup, ResolvedItem};
pub use data_objects::{
    IntentMetadata,
    MaterializeRequest,
    NewPaymentIntent,
    SettlementOutcome,
    SettlementUpdate,
    TransferReceipt,
};
pub use food_court_database::{CheckoutError, FoodCourtDatabase, OrderFlowError};
pub use payment_gateway::{GatewayError, PaymentGateway};
