use fcs_common::Money;
use thiserror::Error;

use crate::traits::{IntentMetadata, TransferReceipt};

/// The abstract external payment capability.
///
/// The engine never talks to a concrete provider; it only needs two operations: opening a payment intent for a
/// combined checkout total, and pushing a seller's share to their payout account. Both are single-attempt, bounded
/// calls — retry policy is the operator's concern, not the engine's.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Open an intent for the combined checkout amount. Returns the provider's opaque intent reference.
    /// Creating an intent must never create an order.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<String, GatewayError>;

    /// Transfer `amount` to `destination`, funded by the source payment transaction. `metadata` carries the order
    /// id/number and commission breakdown for the provider's records.
    async fn transfer(
        &self,
        destination: &str,
        amount: Money,
        source_txn: &str,
        metadata: serde_json::Value,
    ) -> Result<TransferReceipt, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The gateway could not create a payment intent: {0}")]
    IntentCreationFailed(String),
    #[error("The gateway rejected the transfer: {0}")]
    TransferRejected(String),
    #[error("The gateway could not be reached: {0}")]
    Unreachable(String),
}
