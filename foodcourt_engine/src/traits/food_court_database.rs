use fcs_common::Money;
use thiserror::Error;

use crate::{
    db_types::{GroupId, Order, OrderNumber, OrderStatusType, PaymentIntent},
    fce_api::order_objects::OrderSnapshot,
    helpers::PaymentVerificationError,
    traits::{CatalogError, CatalogLookup, GatewayError, MaterializeRequest, NewPaymentIntent, SettlementUpdate},
};

/// The highest-level storage contract for the food court engine.
///
/// Backends must provide:
/// * payment intent persistence and atomic consumption,
/// * all-or-nothing materialization of the sibling orders of one checkout,
/// * guarded order status and line mutations (two staff actions racing on one order must not lose updates),
/// * settlement bookkeeping.
#[allow(async_fn_in_trait)]
pub trait FoodCourtDatabase: Clone + CatalogLookup {
    /// The URL of the database.
    fn url(&self) -> &str;

    async fn insert_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, CheckoutError>;

    async fn fetch_payment_intent(&self, intent_id: &str) -> Result<Option<PaymentIntent>, CheckoutError>;

    /// The orders previously materialized from the given intent, if any. Used to answer duplicate verification
    /// calls idempotently.
    async fn fetch_orders_for_intent(&self, intent_id: &str) -> Result<Vec<OrderSnapshot>, CheckoutError>;

    /// Creates one order (with its lines) per seller group, in a single transaction. On the pre-pay path the
    /// payment intent is consumed in the same transaction; if another call consumed it first, the whole
    /// materialization rolls back with [`CheckoutError::IntentAlreadyConsumed`].
    ///
    /// Order numbers are generated internally; a uniqueness conflict is retried once before surfacing
    /// [`CheckoutError::OrderNumberConflict`].
    async fn materialize_order_group(&self, request: MaterializeRequest) -> Result<Vec<OrderSnapshot>, CheckoutError>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderFlowError>;

    async fn fetch_order_snapshot(&self, number: &OrderNumber) -> Result<Option<OrderSnapshot>, OrderFlowError>;

    async fn fetch_orders_by_group(&self, group_id: &GroupId) -> Result<Vec<OrderSnapshot>, OrderFlowError>;

    /// Moves the order from `from` to `to`, guarded on the current status still being `from` (optimistic lock).
    /// A guard miss means a concurrent staff action won the race and surfaces as
    /// [`OrderFlowError::ConcurrentModification`].
    ///
    /// Transition legality is the caller's responsibility ([`crate::fce_api::OrderFlowApi`]); moving to `Paid`
    /// also flips the payment status to `Paid`.
    async fn transition_order_status(
        &self,
        number: &OrderNumber,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<OrderSnapshot, OrderFlowError>;

    /// Removes a line and recomputes subtotal/charges/total from the remaining lines, atomically. If the removal
    /// empties the order, the order is cancelled in the same transaction.
    async fn remove_order_line(&self, number: &OrderNumber, line_id: i64) -> Result<OrderSnapshot, OrderFlowError>;

    /// Sets a line's quantity (≥ 1) and recomputes the order's totals, atomically.
    async fn set_line_quantity(
        &self,
        number: &OrderNumber,
        line_id: i64,
        quantity: i64,
    ) -> Result<OrderSnapshot, OrderFlowError>;

    /// Writes the settlement fields for an order. Called exactly once per settlement attempt, success or failure.
    async fn record_settlement(&self, order_id: i64, update: SettlementUpdate) -> Result<Order, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

//--------------------------------------    CheckoutError    ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Cart line references an unknown or unavailable menu item: {0}")]
    UnresolvableItem(i64),
    #[error("Invalid quantity: {0}. Quantities must be at least 1")]
    InvalidQuantity(i64),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("No payment intent found with id {0}")]
    IntentNotFound(String),
    #[error("Payment intent {0} has already been consumed")]
    IntentAlreadyConsumed(String),
    #[error("Cart total {computed} does not match the intent amount {intent}")]
    AmountMismatch { intent: Money, computed: Money },
    #[error("Could not generate a unique order number. Retry the checkout")]
    OrderNumberConflict,
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Storage error during checkout: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutError::DatabaseError(e.to_string())
    }
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        CheckoutError::GatewayError(e.to_string())
    }
}

impl From<PaymentVerificationError> for CheckoutError {
    fn from(_: PaymentVerificationError) -> Self {
        CheckoutError::PaymentVerificationFailed
    }
}

//--------------------------------------    OrderFlowError   ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Order line {0} does not exist on this order")]
    LineNotFound(i64),
    #[error("Illegal status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The order can no longer be modified (status is {0})")]
    OrderNotModifiable(OrderStatusType),
    #[error("Invalid quantity: {0}. Use line removal instead of zero")]
    InvalidQuantity(i64),
    #[error("Order {0} was modified concurrently. Re-fetch and retry")]
    ConcurrentModification(OrderNumber),
    #[error("Storage error in the order flow: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<CatalogError> for OrderFlowError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => OrderFlowError::DatabaseError(s),
        }
    }
}
