use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GroupId, OrderNumber, OrderStatusType},
    events::{EventProducers, OrderCancelledEvent, OrderLineChangedEvent, OrderStatusChangedEvent},
    fce_api::order_objects::OrderSnapshot,
    traits::{FoodCourtDatabase, OrderFlowError},
};

/// `OrderFlowApi` owns the order status state machine and the pre-fulfilment line mutation flow.
///
/// The lifecycle is `Pending → Paid → Preparing → Ready → Served`, with `Cancelled` reachable from `Pending` or
/// `Paid` only. Forward transitions are staff-triggered and strictly adjacent; the one system-triggered exception
/// is the automatic cancellation of an order whose last line is removed. Every accepted change is persisted first
/// and then broadcast with the refreshed snapshot.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

/// Whether moving from `from` to `to` is a legal step.
///
/// | From \ To | Paid | Preparing | Ready | Served | Cancelled |
/// |-----------|------|-----------|-------|--------|-----------|
/// | Pending   | ✓    |           |       |        | ✓         |
/// | Paid      |      | ✓         |       |        | ✓         |
/// | Preparing |      |           | ✓     |        |           |
/// | Ready     |      |           |       | ✓      |           |
/// | Served    |      |           |       |        |           |
/// | Cancelled |      |           |       |        |           |
pub fn is_legal_transition(from: OrderStatusType, to: OrderStatusType) -> bool {
    from.next() == Some(to) || (to == OrderStatusType::Cancelled && from.is_cancellable())
}

impl<B> OrderFlowApi<B>
where B: FoodCourtDatabase
{
    /// Move an order to `new_status`.
    ///
    /// The transition is validated against the table above, then applied with the current status as an optimistic
    /// guard, so two staff actions racing on the same order cannot both win. The snapshot is broadcast after the
    /// write commits.
    pub async fn transition_status(
        &self,
        number: &OrderNumber,
        new_status: OrderStatusType,
    ) -> Result<OrderSnapshot, OrderFlowError> {
        let order =
            self.db.fetch_order_by_number(number).await?.ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))?;
        let old_status = order.status;
        if !is_legal_transition(old_status, new_status) {
            return Err(OrderFlowError::InvalidTransition { from: old_status, to: new_status });
        }
        let snapshot = self.db.transition_order_status(number, old_status, new_status).await?;
        debug!("🔄️ Order {number} moved from {old_status} to {new_status}");
        self.broadcast_status_change(&snapshot).await;
        Ok(snapshot)
    }

    /// Remove a line from a modifiable order, recomputing the totals from the remaining lines.
    ///
    /// Removing the last line cancels the order instead of leaving it empty; that cancellation is broadcast
    /// exactly like a staff-triggered one.
    pub async fn remove_line(&self, number: &OrderNumber, line_id: i64) -> Result<OrderSnapshot, OrderFlowError> {
        let snapshot = self.db.remove_order_line(number, line_id).await?;
        if snapshot.order.status == OrderStatusType::Cancelled {
            info!("🔄️ Order {number} emptied by line removal and auto-cancelled");
            self.broadcast_status_change(&snapshot).await;
        } else {
            debug!("🔄️ Line {line_id} removed from order {number}");
            self.broadcast_line_change(&snapshot).await;
        }
        Ok(snapshot)
    }

    /// Change a line's quantity on a modifiable order. Quantities below 1 are rejected; use [`Self::remove_line`]
    /// to take a line off the order.
    pub async fn set_line_quantity(
        &self,
        number: &OrderNumber,
        line_id: i64,
        quantity: i64,
    ) -> Result<OrderSnapshot, OrderFlowError> {
        if quantity < 1 {
            return Err(OrderFlowError::InvalidQuantity(quantity));
        }
        let snapshot = self.db.set_line_quantity(number, line_id, quantity).await?;
        debug!("🔄️ Line {line_id} on order {number} set to quantity {quantity}");
        self.broadcast_line_change(&snapshot).await;
        Ok(snapshot)
    }

    pub async fn fetch_order(&self, number: &OrderNumber) -> Result<OrderSnapshot, OrderFlowError> {
        self.db.fetch_order_snapshot(number).await?.ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))
    }

    /// The strongly consistent read clients reconcile against after missed broadcasts.
    pub async fn fetch_by_group(&self, group_id: &GroupId) -> Result<Vec<OrderSnapshot>, OrderFlowError> {
        self.db.fetch_orders_by_group(group_id).await
    }

    async fn broadcast_status_change(&self, snapshot: &OrderSnapshot) {
        for emitter in &self.producers.order_status_changed_producer {
            emitter.publish_event(OrderStatusChangedEvent::new(snapshot.clone())).await;
        }
        if snapshot.order.status == OrderStatusType::Cancelled {
            for emitter in &self.producers.order_cancelled_producer {
                emitter.publish_event(OrderCancelledEvent::new(snapshot.clone())).await;
            }
        }
    }

    async fn broadcast_line_change(&self, snapshot: &OrderSnapshot) {
        for emitter in &self.producers.order_line_changed_producer {
            emitter.publish_event(OrderLineChangedEvent::new(snapshot.clone())).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::OrderStatusType::*;

    #[test]
    fn only_adjacent_forward_transitions_are_legal() {
        assert!(is_legal_transition(Pending, Paid));
        assert!(is_legal_transition(Paid, Preparing));
        assert!(is_legal_transition(Preparing, Ready));
        assert!(is_legal_transition(Ready, Served));
        // jumps
        assert!(!is_legal_transition(Pending, Preparing));
        assert!(!is_legal_transition(Paid, Ready));
        assert!(!is_legal_transition(Pending, Served));
        // backwards
        assert!(!is_legal_transition(Preparing, Paid));
        assert!(!is_legal_transition(Served, Ready));
        // self-transitions
        assert!(!is_legal_transition(Paid, Paid));
    }

    #[test]
    fn cancellation_is_only_reachable_pre_kitchen() {
        assert!(is_legal_transition(Pending, Cancelled));
        assert!(is_legal_transition(Paid, Cancelled));
        assert!(!is_legal_transition(Preparing, Cancelled));
        assert!(!is_legal_transition(Ready, Cancelled));
        assert!(!is_legal_transition(Served, Cancelled));
        assert!(!is_legal_transition(Cancelled, Cancelled));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for to in [Pending, Paid, Preparing, Ready, Served, Cancelled] {
            assert!(!is_legal_transition(Served, to));
            assert!(!is_legal_transition(Cancelled, to));
        }
    }
}
