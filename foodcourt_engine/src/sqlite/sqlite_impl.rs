//! `SqliteDatabase` is a concrete implementation of a food court engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, intents, new_pool, orders};
use crate::{
    db_types::{GroupId, Order, OrderLine, OrderNumber, OrderStatusType, PaymentIntent, PaymentStatus, Seller},
    fce_api::order_objects::OrderSnapshot,
    splitter::OrderTotals,
    traits::{
        CatalogError,
        CatalogLookup,
        CheckoutError,
        FoodCourtDatabase,
        MaterializeRequest,
        NewPaymentIntent,
        OrderFlowError,
        ResolvedItem,
        SettlementUpdate,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database api object with a connection to the database at `FCS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CatalogLookup for SqliteDatabase {
    async fn resolve_item(&self, menu_item_id: i64) -> Result<Option<ResolvedItem>, CatalogError> {
        let mut conn = self.pool.acquire().await.map_err(CatalogError::from)?;
        let item = catalog::fetch_menu_item(menu_item_id, &mut conn).await?;
        Ok(item.map(|i| ResolvedItem {
            menu_item_id: i.id,
            seller_id: i.seller_id,
            name: i.name,
            price: i.price,
            available: i.available,
        }))
    }

    async fn fetch_seller(&self, seller_id: i64) -> Result<Option<Seller>, CatalogError> {
        let mut conn = self.pool.acquire().await.map_err(CatalogError::from)?;
        let seller = catalog::fetch_seller(seller_id, &mut conn).await?;
        Ok(seller)
    }
}

impl FoodCourtDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, CheckoutError> {
        let mut conn = self.pool.acquire().await.map_err(CheckoutError::from)?;
        let intent = intents::insert_intent(intent, &mut conn).await?;
        debug!("🗃️ Payment intent [{}] saved with id {}", intent.intent_id, intent.id);
        Ok(intent)
    }

    async fn fetch_payment_intent(&self, intent_id: &str) -> Result<Option<PaymentIntent>, CheckoutError> {
        let mut conn = self.pool.acquire().await.map_err(CheckoutError::from)?;
        let intent = intents::fetch_intent(intent_id, &mut conn).await?;
        Ok(intent)
    }

    async fn fetch_orders_for_intent(&self, intent_id: &str) -> Result<Vec<OrderSnapshot>, CheckoutError> {
        let mut conn = self.pool.acquire().await.map_err(CheckoutError::from)?;
        let order_rows = orders::fetch_orders_for_intent(intent_id, &mut conn).await?;
        let mut snapshots = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            let lines = orders::fetch_lines(order.id, &mut conn).await?;
            snapshots.push(OrderSnapshot::new(order, lines));
        }
        Ok(snapshots)
    }

    /// Takes one split checkout and, in a single atomic transaction,
    /// * consumes the payment intent if one is supplied. If another call got there first, the whole
    ///   materialization rolls back and [`CheckoutError::IntentAlreadyConsumed`] is returned.
    /// * inserts one order per seller group, with its lines, generating order numbers as it goes.
    ///
    /// Either every sibling order exists afterwards, or none do.
    async fn materialize_order_group(&self, request: MaterializeRequest) -> Result<Vec<OrderSnapshot>, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(CheckoutError::from)?;
        let intent_id = match &request.intent {
            Some(sig) => {
                let consumed = intents::consume_intent(&sig.intent_id, &sig.txn_id, &mut tx).await?;
                if !consumed {
                    return Err(CheckoutError::IntentAlreadyConsumed(sig.intent_id.clone()));
                }
                debug!("🗃️ Intent [{}] consumed against txn [{}]", sig.intent_id, sig.txn_id);
                Some(sig.intent_id.clone())
            },
            None => None,
        };
        let status = match request.payment_status {
            PaymentStatus::Paid => OrderStatusType::Paid,
            PaymentStatus::Unpaid => OrderStatusType::Pending,
        };
        let mut snapshots = Vec::with_capacity(request.groups.len());
        for group in &request.groups {
            let new_order = orders::NewOrder {
                group_id: request.group_id.clone(),
                intent_id: intent_id.clone(),
                seller_id: group.seller_id,
                fulfilment: request.fulfilment,
                totals: group.totals,
                payment_status: request.payment_status,
                payment_method: request.payment_method,
                status,
            };
            let order = orders::insert_order(new_order, &mut tx).await?;
            let mut lines = Vec::with_capacity(group.lines.len());
            for line in &group.lines {
                lines.push(orders::insert_order_line(order.id, line, &mut tx).await?);
            }
            snapshots.push(OrderSnapshot::new(order, lines));
        }
        tx.commit().await.map_err(CheckoutError::from)?;
        debug!("🗃️ Materialized {} order(s) in one transaction", snapshots.len());
        Ok(snapshots)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(OrderFlowError::from)?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_snapshot(&self, number: &OrderNumber) -> Result<Option<OrderSnapshot>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(OrderFlowError::from)?;
        let Some(order) = orders::fetch_order_by_number(number, &mut conn).await? else {
            return Ok(None);
        };
        let lines = orders::fetch_lines(order.id, &mut conn).await?;
        Ok(Some(OrderSnapshot::new(order, lines)))
    }

    async fn fetch_orders_by_group(&self, group_id: &GroupId) -> Result<Vec<OrderSnapshot>, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(OrderFlowError::from)?;
        let order_rows = orders::fetch_orders_by_group(group_id, &mut conn).await?;
        let mut snapshots = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            let lines = orders::fetch_lines(order.id, &mut conn).await?;
            snapshots.push(OrderSnapshot::new(order, lines));
        }
        Ok(snapshots)
    }

    async fn transition_order_status(
        &self,
        number: &OrderNumber,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<OrderSnapshot, OrderFlowError> {
        let mut tx = self.pool.begin().await.map_err(OrderFlowError::from)?;
        let updated = orders::update_order_status(number, from, to, &mut tx).await?;
        if updated == 0 {
            // Zero rows: either the order is gone, or the guard missed because someone moved it first.
            return match orders::fetch_order_by_number(number, &mut tx).await? {
                None => Err(OrderFlowError::OrderNotFound(number.clone())),
                Some(_) => Err(OrderFlowError::ConcurrentModification(number.clone())),
            };
        }
        let order = orders::fetch_order_by_number(number, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))?;
        let lines = orders::fetch_lines(order.id, &mut tx).await?;
        tx.commit().await.map_err(OrderFlowError::from)?;
        debug!("🗃️ Order {number} status updated to {to}");
        Ok(OrderSnapshot::new(order, lines))
    }

    async fn remove_order_line(&self, number: &OrderNumber, line_id: i64) -> Result<OrderSnapshot, OrderFlowError> {
        let mut tx = self.pool.begin().await.map_err(OrderFlowError::from)?;
        let order = fetch_modifiable_order(number, &mut tx).await?;
        let line =
            orders::fetch_line(order.id, line_id, &mut tx).await?.ok_or(OrderFlowError::LineNotFound(line_id))?;
        orders::delete_line(line.id, &mut tx).await.map_err(|e| write_conflict(e, number))?;
        let remaining = orders::fetch_lines(order.id, &mut tx).await?;
        let rows = if remaining.is_empty() {
            debug!("🗃️ Order {number} has no lines left and is being cancelled");
            orders::cancel_order(order.id, order.status, &mut tx).await.map_err(|e| write_conflict(e, number))?
        } else {
            let totals = OrderTotals::for_line_totals(remaining.iter().map(OrderLine::line_total));
            orders::update_order_totals(order.id, totals, order.status, &mut tx)
                .await
                .map_err(|e| write_conflict(e, number))?
        };
        if rows == 0 {
            // The guard missed: another action moved the order after we read it. The tx rolls back on drop.
            return Err(OrderFlowError::ConcurrentModification(number.clone()));
        }
        let order = refetch(order.id, number, &mut tx).await?;
        tx.commit().await.map_err(OrderFlowError::from)?;
        Ok(OrderSnapshot::new(order, remaining))
    }

    async fn set_line_quantity(
        &self,
        number: &OrderNumber,
        line_id: i64,
        quantity: i64,
    ) -> Result<OrderSnapshot, OrderFlowError> {
        if quantity < 1 {
            return Err(OrderFlowError::InvalidQuantity(quantity));
        }
        let mut tx = self.pool.begin().await.map_err(OrderFlowError::from)?;
        let order = fetch_modifiable_order(number, &mut tx).await?;
        let line =
            orders::fetch_line(order.id, line_id, &mut tx).await?.ok_or(OrderFlowError::LineNotFound(line_id))?;
        orders::update_line_quantity(line.id, quantity, &mut tx).await.map_err(|e| write_conflict(e, number))?;
        let lines = orders::fetch_lines(order.id, &mut tx).await?;
        let totals = OrderTotals::for_line_totals(lines.iter().map(OrderLine::line_total));
        let rows = orders::update_order_totals(order.id, totals, order.status, &mut tx)
            .await
            .map_err(|e| write_conflict(e, number))?;
        if rows == 0 {
            return Err(OrderFlowError::ConcurrentModification(number.clone()));
        }
        let order = refetch(order.id, number, &mut tx).await?;
        tx.commit().await.map_err(OrderFlowError::from)?;
        Ok(OrderSnapshot::new(order, lines))
    }

    async fn record_settlement(&self, order_id: i64, update: SettlementUpdate) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await.map_err(OrderFlowError::from)?;
        let order = orders::record_settlement(order_id, update, &mut conn)
            .await?
            .ok_or_else(|| OrderFlowError::DatabaseError(format!("order id {order_id} does not exist")))?;
        debug!("🗃️ Settlement recorded for order {} ({})", order.order_number, order.settlement_status);
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

async fn fetch_modifiable_order(
    number: &OrderNumber,
    conn: &mut sqlx::SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let order =
        orders::fetch_order_by_number(number, conn).await?.ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))?;
    if !order.status.is_modifiable() {
        return Err(OrderFlowError::OrderNotModifiable(order.status));
    }
    Ok(order)
}

async fn refetch(order_id: i64, number: &OrderNumber, conn: &mut sqlx::SqliteConnection) -> Result<Order, OrderFlowError> {
    orders::fetch_order_by_id(order_id, conn).await?.ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))
}

/// SQLITE_BUSY on a line-mutation write means another transaction holds the order. That is the same lost race as
/// a missed status guard, so it surfaces as the retryable conflict rather than a storage error.
fn write_conflict(e: sqlx::Error, number: &OrderNumber) -> OrderFlowError {
    match &e {
        sqlx::Error::Database(de) if de.code().as_deref() == Some("5") || de.code().as_deref() == Some("517") => {
            OrderFlowError::ConcurrentModification(number.clone())
        },
        _ => OrderFlowError::from(e),
    }
}
