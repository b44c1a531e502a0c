use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{
        FulfilmentType,
        GroupId,
        Order,
        OrderLine,
        OrderNumber,
        OrderStatusType,
        PaymentMethod,
        PaymentStatus,
    },
    helpers::generate_order_number,
    splitter::{OrderTotals, ResolvedLine},
    traits::{CheckoutError, SettlementUpdate},
};

/// The order-level fields of one seller group about to be persisted. The order number is generated inside
/// [`insert_order`] rather than carried here.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub group_id: Option<GroupId>,
    pub intent_id: Option<String>,
    pub seller_id: i64,
    pub fulfilment: FulfilmentType,
    pub totals: OrderTotals,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
}

/// Inserts a new order with a freshly generated order number. Uniqueness is enforced by the DB constraint; a
/// collision regenerates the number once before surfacing [`CheckoutError::OrderNumberConflict`].
///
/// This is not atomic on its own. Embed the call inside a transaction and pass `&mut *tx` as the connection
/// argument to make the sibling inserts all-or-nothing.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutError> {
    let mut number = OrderNumber::from(generate_order_number());
    for attempt in 0..2 {
        match try_insert_order(&number, &order, &mut *conn).await {
            Ok(order) => {
                debug!("📝️ Order {number} inserted with id {}", order.id);
                return Ok(order);
            },
            Err(sqlx::Error::Database(de)) if de.is_unique_violation() && attempt == 0 => {
                debug!("📝️ Order number {number} collided. Regenerating once.");
                number = OrderNumber::from(generate_order_number());
            },
            Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
                return Err(CheckoutError::OrderNumberConflict);
            },
            Err(e) => return Err(e.into()),
        }
    }
    Err(CheckoutError::OrderNumberConflict)
}

async fn try_insert_order(
    number: &OrderNumber,
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                group_id,
                intent_id,
                seller_id,
                fulfilment,
                subtotal,
                service_charge,
                tax,
                total,
                payment_status,
                payment_method,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(number.as_str())
    .bind(order.group_id.as_ref().map(GroupId::as_str))
    .bind(order.intent_id.as_deref())
    .bind(order.seller_id)
    .bind(order.fulfilment)
    .bind(order.totals.subtotal)
    .bind(order.totals.service_charge)
    .bind(order.totals.tax)
    .bind(order.totals.total)
    .bind(order.payment_status)
    .bind(order.payment_method)
    .bind(order.status)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_line(
    order_id: i64,
    line: &ResolvedLine,
    conn: &mut SqliteConnection,
) -> Result<OrderLine, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
            INSERT INTO order_lines (order_id, menu_item_id, name, quantity, unit_price, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.menu_item_id)
    .bind(line.name.as_str())
    .bind(line.quantity)
    .bind(line.unit_price)
    .bind(line.note.as_deref())
    .fetch_one(conn)
    .await?;
    Ok(line)
}

pub async fn fetch_order_by_number(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Lines are returned in insertion order, matching the cart order the guest submitted.
pub async fn fetch_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

pub async fn fetch_line(
    order_id: i64,
    line_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderLine>, sqlx::Error> {
    let line = sqlx::query_as("SELECT * FROM order_lines WHERE id = $1 AND order_id = $2")
        .bind(line_id)
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

pub async fn fetch_orders_by_group(group_id: &GroupId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE group_id = $1 ORDER BY id")
        .bind(group_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_orders_for_intent(intent_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE intent_id = $1 ORDER BY id")
        .bind(intent_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Applies a status transition guarded on the current status still being `from`. Returns the number of rows
/// updated; zero means the order is missing or someone else moved it first, and the caller decides which.
///
/// Moving to `Paid` also flips the payment status, which is how pay-later orders record the cash changing hands.
pub async fn update_order_status(
    number: &OrderNumber,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET
                status = $3,
                payment_status = CASE WHEN $3 = 'Paid' THEN 'Paid' ELSE payment_status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_number = $1 AND status = $2
        "#,
    )
    .bind(number.as_str())
    .bind(from)
    .bind(to)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_line(line_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM order_lines WHERE id = $1").bind(line_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn update_line_quantity(line_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE order_lines SET quantity = $2 WHERE id = $1")
        .bind(line_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(())
}

/// Rewrites the monetary fields after a line mutation so the stored totals always match the line contents.
///
/// Guarded on the order still being in the status the caller read it at. Returns the number of rows updated;
/// zero means a concurrent action moved the order first and the mutation must not stand.
pub async fn update_order_totals(
    order_id: i64,
    totals: OrderTotals,
    seen_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET
                subtotal = $2,
                service_charge = $3,
                tax = $4,
                total = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = $6
        "#,
    )
    .bind(order_id)
    .bind(totals.subtotal)
    .bind(totals.service_charge)
    .bind(totals.tax)
    .bind(totals.total)
    .bind(seen_status)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Cancels an order, guarded on the status the caller read it at. Returns the number of rows updated.
pub async fn cancel_order(
    order_id: i64,
    seen_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE orders SET status = 'Cancelled', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = $2")
            .bind(order_id)
            .bind(seen_status)
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}

pub async fn record_settlement(
    order_id: i64,
    update: SettlementUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                transfer_id = $2,
                transfer_amount = $3,
                commission = $4,
                transfer_status = $5,
                settlement_status = $6,
                settled_at = $7,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(update.transfer_id.as_deref())
    .bind(update.transfer_amount)
    .bind(update.commission)
    .bind(update.transfer_status)
    .bind(update.settlement_status)
    .bind(update.settled_at)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
