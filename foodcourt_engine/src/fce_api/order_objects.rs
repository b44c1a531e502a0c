use fcs_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{GroupId, Order, OrderLine};

/// An order together with its current lines. This is what handlers return and what every broadcast event carries,
/// so subscribers always see totals and lines from the same read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderSnapshot {
    pub fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self { order, lines }
    }
}

/// The result of a checkout: the materialized sibling orders and, for multi-seller checkouts, the correlation id
/// they share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub orders: Vec<OrderSnapshot>,
    pub group_id: Option<GroupId>,
}

/// The pre-pay entry point's answer: the opaque gateway reference and the combined amount the guest will be
/// charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent_id: String,
    pub amount: Money,
    pub currency: String,
}
