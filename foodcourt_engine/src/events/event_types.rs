use serde::{Deserialize, Serialize};

use crate::{
    db_types::{OrderNumber, OrderStatusType},
    fce_api::order_objects::OrderSnapshot,
};

/// The catch-all channel dashboards subscribe to for orders across every seller.
pub const ALL_SELLERS_CHANNEL: &str = "sellers.all";

pub fn seller_channel(seller_id: i64) -> String {
    format!("seller.{seller_id}")
}

pub fn customer_channel(order_number: &OrderNumber) -> String {
    format!("order.{}", order_number.as_str())
}

/// Published once per materialized order, scoped to the owning seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: OrderSnapshot,
}

impl OrderCreatedEvent {
    pub fn new(order: OrderSnapshot) -> Self {
        Self { order }
    }

    pub fn seller_channel(&self) -> String {
        seller_channel(self.order.order.seller_id)
    }

    pub fn customer_channel(&self) -> String {
        customer_channel(&self.order.order.order_number)
    }
}

/// Published for every status transition, staff- or system-triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_number: OrderNumber,
    pub status: OrderStatusType,
    pub order: OrderSnapshot,
}

impl OrderStatusChangedEvent {
    pub fn new(order: OrderSnapshot) -> Self {
        let order_number = order.order.order_number.clone();
        let status = order.order.status;
        Self { order_number, status, order }
    }

    pub fn seller_channel(&self) -> String {
        seller_channel(self.order.order.seller_id)
    }

    pub fn customer_channel(&self) -> String {
        customer_channel(&self.order_number)
    }
}

/// Published when staff remove a line or change a line quantity. The snapshot carries the recomputed totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineChangedEvent {
    pub order_number: OrderNumber,
    pub order: OrderSnapshot,
}

impl OrderLineChangedEvent {
    pub fn new(order: OrderSnapshot) -> Self {
        let order_number = order.order.order_number.clone();
        Self { order_number, order }
    }

    pub fn seller_channel(&self) -> String {
        seller_channel(self.order.order.seller_id)
    }

    pub fn customer_channel(&self) -> String {
        customer_channel(&self.order_number)
    }
}

/// Published alongside the status-change event whenever an order reaches `Cancelled`. Carries no indication of
/// whether the cancellation was staff-triggered or the automatic last-line-removed kind; subscribers cannot and
/// should not tell the two apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order_number: OrderNumber,
    pub order: OrderSnapshot,
}

impl OrderCancelledEvent {
    pub fn new(order: OrderSnapshot) -> Self {
        let order_number = order.order.order_number.clone();
        Self { order_number, order }
    }

    pub fn seller_channel(&self) -> String {
        seller_channel(self.order.order.seller_id)
    }

    pub fn customer_channel(&self) -> String {
        customer_channel(&self.order_number)
    }
}
