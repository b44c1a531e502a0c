use chrono::{DateTime, Utc};
use fcs_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{FulfilmentType, GroupId, OrderNumber, PaymentMethod, PaymentStatus, SettlementStatus, TransferStatus},
    helpers::PaymentSignature,
    splitter::SellerGroup,
};

/// Reconciliation metadata attached to a payment intent at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub item_count: i64,
    pub subtotal: Money,
    pub service_charge: Money,
    pub tax: Money,
}

/// A payment intent row about to be persisted.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub intent_id: String,
    pub amount: Money,
    pub currency: String,
    pub metadata: IntentMetadata,
}

/// Everything the storage layer needs to turn one verified (or pay-later) checkout into its sibling orders,
/// atomically.
#[derive(Debug, Clone)]
pub struct MaterializeRequest {
    pub groups: Vec<SellerGroup>,
    pub group_id: Option<GroupId>,
    pub fulfilment: FulfilmentType,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Present on the pre-pay path. The intent is consumed in the same transaction as the order inserts, which is
    /// what makes duplicate verification calls idempotent.
    pub intent: Option<PaymentSignature>,
}

/// The settlement bookkeeping written onto an order after a transfer attempt (or a skipped one).
#[derive(Debug, Clone)]
pub struct SettlementUpdate {
    pub transfer_id: Option<String>,
    pub transfer_amount: Money,
    pub commission: Money,
    pub transfer_status: TransferStatus,
    pub settlement_status: SettlementStatus,
    pub settled_at: Option<DateTime<Utc>>,
}

/// A successful transfer as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub amount: Money,
    pub processed_at: DateTime<Utc>,
}

/// The per-order result of a settlement run. Failures are captured here rather than propagated; one seller's
/// failed transfer never blocks the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub order_id: i64,
    pub order_number: OrderNumber,
    pub seller_id: i64,
    pub total: Money,
    pub commission: Money,
    pub transfer_amount: Money,
    pub transfer_id: Option<String>,
    pub transfer_status: TransferStatus,
    pub settlement_status: SettlementStatus,
    pub error: Option<String>,
}

impl SettlementOutcome {
    pub fn succeeded(&self) -> bool {
        self.transfer_status == TransferStatus::Success
    }
}
