use std::fmt::Debug;

use fcs_common::{Secret, DEFAULT_CURRENCY_CODE};
use log::*;

use crate::{
    db_types::{CartLine, FulfilmentType, GroupId, IntentStatus, PaymentMethod, PaymentStatus},
    events::{EventProducers, OrderCreatedEvent},
    fce_api::order_objects::{CheckoutResult, IntentResult, OrderSnapshot},
    helpers::PaymentSignature,
    splitter::{split_cart, CartSplit, ResolvedLine},
    traits::{CheckoutError, FoodCourtDatabase, IntentMetadata, MaterializeRequest, NewPaymentIntent, PaymentGateway},
};

/// `CheckoutApi` drives the checkout pipeline: cart resolution and splitting, payment intent creation, signature
/// verification and order materialization.
///
/// The one rule everything here serves: on the pre-pay path, an order exists if and only if the payment callback's
/// signature verified against the server-held secret. Intent creation never creates orders; a failed verification
/// never creates orders; a duplicate verification never creates a second set.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    payment_secret: Secret<String>,
    producers: EventProducers,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, payment_secret: Secret<String>, producers: EventProducers) -> Self {
        Self { db, gateway, payment_secret, producers }
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: FoodCourtDatabase,
    G: PaymentGateway,
{
    /// Pre-pay path entry point. Splits the cart, opens a gateway intent for the combined total, and persists the
    /// intent with reconciliation metadata. No order rows are touched.
    ///
    /// Retried checkouts must call this again; intents are never reused across attempts.
    pub async fn create_payment_intent(&self, cart: &[CartLine]) -> Result<IntentResult, CheckoutError> {
        let split = self.resolve_and_split(cart).await?;
        let metadata = IntentMetadata {
            item_count: split.item_count,
            subtotal: split.combined.subtotal,
            service_charge: split.combined.service_charge,
            tax: split.combined.tax,
        };
        let amount = split.combined_total();
        let intent_id = self.gateway.create_intent(amount, DEFAULT_CURRENCY_CODE, &metadata).await?;
        let intent = self
            .db
            .insert_payment_intent(NewPaymentIntent {
                intent_id,
                amount,
                currency: DEFAULT_CURRENCY_CODE.to_string(),
                metadata,
            })
            .await?;
        info!("💳️ Payment intent [{}] created for {} across {} seller(s)", intent.intent_id, amount, split.groups.len());
        Ok(IntentResult { intent_id: intent.intent_id, amount: intent.amount, currency: intent.currency })
    }

    /// The pre-pay materialization gate.
    ///
    /// The supplied signature is checked against the server-held secret before anything else touches storage. On
    /// success, one order per seller group is created atomically, the intent is consumed in the same transaction,
    /// and an `order.created` event is published per order. Calling again with the same credentials returns the
    /// already-materialized orders instead of creating more.
    pub async fn verify_and_materialize(
        &self,
        signature: &PaymentSignature,
        cart: &[CartLine],
        fulfilment: FulfilmentType,
        existing_group_id: Option<GroupId>,
    ) -> Result<CheckoutResult, CheckoutError> {
        if let Err(e) = signature.verify(&self.payment_secret) {
            warn!("🔐️ Rejecting checkout for intent [{}]: {e}", signature.intent_id);
            return Err(e.into());
        }
        let intent = self
            .db
            .fetch_payment_intent(&signature.intent_id)
            .await?
            .ok_or_else(|| CheckoutError::IntentNotFound(signature.intent_id.clone()))?;
        if intent.status == IntentStatus::Verified {
            debug!("💳️ Intent [{}] was already verified. Returning the existing orders.", intent.intent_id);
            return self.existing_orders_for_intent(&intent.intent_id).await;
        }
        let split = self.resolve_and_split(cart).await?;
        if split.combined_total() != intent.amount {
            warn!(
                "💳️ Cart re-submitted for intent [{}] computes to {} but the intent was created for {}",
                intent.intent_id,
                split.combined_total(),
                intent.amount
            );
            return Err(CheckoutError::AmountMismatch { intent: intent.amount, computed: split.combined_total() });
        }
        let group_id = existing_group_id.or_else(|| split.group_id.clone());
        let request = MaterializeRequest {
            groups: split.groups,
            group_id: group_id.clone(),
            fulfilment,
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Online,
            intent: Some(signature.clone()),
        };
        let orders = match self.db.materialize_order_group(request).await {
            Ok(orders) => orders,
            Err(CheckoutError::IntentAlreadyConsumed(id)) => {
                // A concurrent verification won the race; its orders are the canonical result.
                debug!("💳️ Intent [{id}] was consumed concurrently. Returning the winner's orders.");
                return self.existing_orders_for_intent(&id).await;
            },
            Err(e) => return Err(e),
        };
        info!(
            "🧾️ Intent [{}] verified against txn [{}]: materialized {} order(s){}",
            signature.intent_id,
            signature.txn_id,
            orders.len(),
            group_id.as_ref().map(|g| format!(" in group {g}")).unwrap_or_default()
        );
        self.call_order_created_hooks(&orders).await;
        Ok(CheckoutResult { orders, group_id })
    }

    /// Pay-later path: orders are created immediately, unpaid, defaulting to cash; settlement happens after
    /// fulfilment, outside this flow. No payment intent or signature is involved by design.
    pub async fn materialize_unpaid(
        &self,
        cart: &[CartLine],
        fulfilment: FulfilmentType,
        existing_group_id: Option<GroupId>,
    ) -> Result<CheckoutResult, CheckoutError> {
        let split = self.resolve_and_split(cart).await?;
        let group_id = existing_group_id.or_else(|| split.group_id.clone());
        let request = MaterializeRequest {
            groups: split.groups,
            group_id: group_id.clone(),
            fulfilment,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Cash,
            intent: None,
        };
        let orders = self.db.materialize_order_group(request).await?;
        info!(
            "🧾️ Materialized {} unpaid order(s){}",
            orders.len(),
            group_id.as_ref().map(|g| format!(" in group {g}")).unwrap_or_default()
        );
        self.call_order_created_hooks(&orders).await;
        Ok(CheckoutResult { orders, group_id })
    }

    async fn resolve_and_split(&self, cart: &[CartLine]) -> Result<CartSplit, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let mut lines = Vec::with_capacity(cart.len());
        for cart_line in cart {
            let item = self
                .db
                .resolve_item(cart_line.menu_item_id)
                .await?
                .filter(|i| i.available)
                .ok_or(CheckoutError::UnresolvableItem(cart_line.menu_item_id))?;
            lines.push(ResolvedLine::from_cart_line(cart_line, &item));
        }
        split_cart(lines)
    }

    async fn existing_orders_for_intent(&self, intent_id: &str) -> Result<CheckoutResult, CheckoutError> {
        let orders = self.db.fetch_orders_for_intent(intent_id).await?;
        let group_id = orders.iter().find_map(|o| o.order.group_id.clone());
        Ok(CheckoutResult { orders, group_id })
    }

    async fn call_order_created_hooks(&self, orders: &[OrderSnapshot]) {
        for emitter in &self.producers.order_created_producer {
            for order in orders {
                let event = OrderCreatedEvent::new(order.clone());
                emitter.publish_event(event).await;
            }
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
