use std::fmt::Debug;

use chrono::Utc;
use fcs_common::Money;
use log::*;
use serde_json::json;

use crate::{
    db_types::{Order, PaymentStatus, Seller, SettlementStatus, TransferStatus},
    fce_api::order_objects::OrderSnapshot,
    traits::{FoodCourtDatabase, PaymentGateway, SettlementOutcome, SettlementUpdate},
};

/// `SettlementApi` pays each seller their share of a paid order, minus the platform commission.
///
/// Settlement is bookkeeping, not checkout: nothing here can fail the orders themselves. Every attempt — made,
/// skipped or rejected — is recorded on the order and reported in a [`SettlementOutcome`], and a failed transfer
/// for one sibling never stops the run for the others.
pub struct SettlementApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for SettlementApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi")
    }
}

impl<B, G> SettlementApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B, G> SettlementApi<B, G>
where
    B: FoodCourtDatabase,
    G: PaymentGateway,
{
    /// Settle the sibling orders of one checkout, sequentially. The orders are processed one at a time as a
    /// courtesy to the transfer provider's rate limits; different checkouts may settle concurrently.
    pub async fn settle_order_group(&self, orders: &[OrderSnapshot], source_txn: &str) -> Vec<SettlementOutcome> {
        let mut outcomes = Vec::with_capacity(orders.len());
        for snapshot in orders {
            outcomes.push(self.settle_order(&snapshot.order, source_txn).await);
        }
        let failures = outcomes.iter().filter(|o| o.error.is_some()).count();
        if failures > 0 {
            warn!("🏦️ Settlement run finished with {failures}/{} order(s) flagged for manual settlement", outcomes.len());
        } else {
            debug!("🏦️ Settlement run finished cleanly for {} order(s)", outcomes.len());
        }
        outcomes
    }

    /// Settle a single order. Never returns an error: downstream failures degrade to "flagged for manual
    /// settlement" and are reported in the outcome record.
    pub async fn settle_order(&self, order: &Order, source_txn: &str) -> SettlementOutcome {
        // A recorded commission means this order already had its one settlement attempt. Duplicate checkout
        // verifications replay the run; report the recorded state instead of moving money twice.
        if order.commission.is_some() {
            debug!("🏦️ Order {} already has a settlement attempt recorded. Not repeating it.", order.order_number);
            return SettlementOutcome {
                order_id: order.id,
                order_number: order.order_number.clone(),
                seller_id: order.seller_id,
                total: order.total,
                commission: order.commission.unwrap_or(Money::from(0)),
                transfer_amount: order.transfer_amount.unwrap_or(Money::from(0)),
                transfer_id: order.transfer_id.clone(),
                transfer_status: order.transfer_status,
                settlement_status: order.settlement_status,
                error: None,
            };
        }
        let commission_pair = match self.commission_for(order).await {
            Ok(pair) => pair,
            Err(detail) => {
                error!("🏦️ Could not start settlement for order {}: {detail}", order.order_number);
                return SettlementOutcome {
                    order_id: order.id,
                    order_number: order.order_number.clone(),
                    seller_id: order.seller_id,
                    total: order.total,
                    commission: Money::from(0),
                    transfer_amount: Money::from(0),
                    transfer_id: None,
                    transfer_status: TransferStatus::NotAttempted,
                    settlement_status: SettlementStatus::Pending,
                    error: Some(detail),
                };
            },
        };
        let (seller, commission, transfer_amount) = commission_pair;
        let mut outcome = SettlementOutcome {
            order_id: order.id,
            order_number: order.order_number.clone(),
            seller_id: order.seller_id,
            total: order.total,
            commission,
            transfer_amount,
            transfer_id: None,
            transfer_status: TransferStatus::NotAttempted,
            settlement_status: SettlementStatus::Pending,
            error: None,
        };
        let Some(destination) = seller.payout_account.as_deref() else {
            info!(
                "🏦️ Seller {} has no payout account linked. Order {} is flagged for manual settlement.",
                seller.id, order.order_number
            );
            self.record(order, &mut outcome, None).await;
            return outcome;
        };
        let metadata = json!({
            "order_id": order.id,
            "order_number": order.order_number.as_str(),
            "seller_id": seller.id,
            "order_total": order.total.value(),
            "commission": commission.value(),
            "transfer_amount": transfer_amount.value(),
        });
        match self.gateway.transfer(destination, transfer_amount, source_txn, metadata).await {
            Ok(receipt) => {
                debug!(
                    "🏦️ Transferred {transfer_amount} to seller {} for order {} (transfer id {})",
                    seller.id, order.order_number, receipt.transfer_id
                );
                outcome.transfer_status = TransferStatus::Success;
                outcome.settlement_status = SettlementStatus::Completed;
                outcome.transfer_id = Some(receipt.transfer_id);
                self.record(order, &mut outcome, Some(Utc::now())).await;
            },
            Err(e) => {
                warn!(
                    "🏦️ Transfer to seller {} failed for order {}: {e}. Flagged for manual settlement.",
                    seller.id, order.order_number
                );
                outcome.transfer_status = TransferStatus::Failed;
                outcome.settlement_status = SettlementStatus::Pending;
                outcome.error = Some(e.to_string());
                self.record(order, &mut outcome, None).await;
            },
        }
        outcome
    }

    /// Fetch the seller and compute the (commission, transfer amount) pair. Both branches of the settlement —
    /// attempted and skipped — go through here, so the `transfer_amount + commission == total` invariant holds
    /// for every recorded attempt.
    async fn commission_for(&self, order: &Order) -> Result<(Seller, Money, Money), String> {
        if order.payment_status != PaymentStatus::Paid {
            return Err(format!("order {} is not paid yet", order.order_number));
        }
        let seller = self
            .db
            .fetch_seller(order.seller_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("seller {} does not exist", order.seller_id))?;
        let commission = order.total.percentage(seller.commission_rate);
        let transfer_amount = order.total - commission;
        Ok((seller, commission, transfer_amount))
    }

    async fn record(&self, order: &Order, outcome: &mut SettlementOutcome, settled_at: Option<chrono::DateTime<Utc>>) {
        let update = SettlementUpdate {
            transfer_id: outcome.transfer_id.clone(),
            transfer_amount: outcome.transfer_amount,
            commission: outcome.commission,
            transfer_status: outcome.transfer_status,
            settlement_status: outcome.settlement_status,
            settled_at,
        };
        if let Err(e) = self.db.record_settlement(order.id, update).await {
            error!("🏦️ Could not record the settlement outcome for order {}: {e}", order.order_number);
            outcome.error.get_or_insert_with(|| format!("settlement bookkeeping failed: {e}"));
        }
    }
}
