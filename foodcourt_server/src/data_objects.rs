use std::fmt::Display;

use foodcourt_engine::{
    db_types::{CartLine, FulfilmentType, GroupId, OrderStatusType},
    order_objects::OrderSnapshot,
    traits::SettlementOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cart: Vec<CartLine>,
    #[serde(default = "default_fulfilment")]
    pub fulfilment: FulfilmentType,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

fn default_fulfilment() -> FulfilmentType {
    FulfilmentType::DineIn
}

/// The gateway callback payload: the attestation triple plus the cart being paid for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCheckoutRequest {
    pub intent_id: String,
    pub txn_id: String,
    pub signature: String,
    pub cart: Vec<CartLine>,
    #[serde(default = "default_fulfilment")]
    pub fulfilment: FulfilmentType,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityUpdateRequest {
    pub quantity: i64,
}

/// The verify endpoint's answer: the materialized orders plus the settlement outcomes of this run. Settlement
/// failures appear here as flagged outcomes, never as an error status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedCheckoutResponse {
    pub orders: Vec<OrderSnapshot>,
    pub group_id: Option<GroupId>,
    pub settlements: Vec<SettlementOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderGroupResponse {
    pub orders: Vec<OrderSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
