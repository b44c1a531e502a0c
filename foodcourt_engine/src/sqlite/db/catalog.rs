use fcs_common::Money;
use sqlx::SqliteConnection;

use crate::db_types::{MenuItem, Seller};

pub async fn fetch_seller(seller_id: i64, conn: &mut SqliteConnection) -> Result<Option<Seller>, sqlx::Error> {
    let seller =
        sqlx::query_as("SELECT * FROM sellers WHERE id = $1").bind(seller_id).fetch_optional(conn).await?;
    Ok(seller)
}

pub async fn fetch_menu_item(menu_item_id: i64, conn: &mut SqliteConnection) -> Result<Option<MenuItem>, sqlx::Error> {
    let item =
        sqlx::query_as("SELECT * FROM menu_items WHERE id = $1").bind(menu_item_id).fetch_optional(conn).await?;
    Ok(item)
}

pub async fn insert_seller(
    name: &str,
    commission_rate: f64,
    payout_account: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Seller, sqlx::Error> {
    let seller = sqlx::query_as(
        r#"
            INSERT INTO sellers (name, commission_rate, payout_account)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(name)
    .bind(commission_rate)
    .bind(payout_account)
    .fetch_one(conn)
    .await?;
    Ok(seller)
}

pub async fn insert_menu_item(
    seller_id: i64,
    name: &str,
    price: Money,
    conn: &mut SqliteConnection,
) -> Result<MenuItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO menu_items (seller_id, name, price)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(seller_id)
    .bind(name)
    .bind(price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

/// Marks a menu item as (un)available. Unavailable items resolve as missing at checkout; existing order lines
/// referencing them are untouched.
pub async fn set_item_availability(
    menu_item_id: i64,
    available: bool,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE menu_items SET available = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(menu_item_id)
        .bind(available)
        .execute(conn)
        .await?;
    Ok(())
}
