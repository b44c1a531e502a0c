use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::PaymentIntent, traits::NewPaymentIntent};

pub async fn insert_intent(intent: NewPaymentIntent, conn: &mut SqliteConnection) -> Result<PaymentIntent, sqlx::Error> {
    let intent = sqlx::query_as(
        r#"
            INSERT INTO payment_intents (intent_id, amount, currency, item_count, subtotal, service_charge, tax)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(intent.intent_id)
    .bind(intent.amount)
    .bind(intent.currency)
    .bind(intent.metadata.item_count)
    .bind(intent.metadata.subtotal)
    .bind(intent.metadata.service_charge)
    .bind(intent.metadata.tax)
    .fetch_one(conn)
    .await?;
    Ok(intent)
}

pub async fn fetch_intent(intent_id: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentIntent>, sqlx::Error> {
    let intent = sqlx::query_as("SELECT * FROM payment_intents WHERE intent_id = $1")
        .bind(intent_id)
        .fetch_optional(conn)
        .await?;
    Ok(intent)
}

/// Flips the intent from `Created` to `Verified`, recording the transaction it was verified against. The guard on
/// the current status makes this a single-winner operation: exactly one caller sees `true`, everyone else `false`.
pub async fn consume_intent(intent_id: &str, txn_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE payment_intents SET status = 'Verified', txn_id = $2, updated_at = CURRENT_TIMESTAMP
            WHERE intent_id = $1 AND status = 'Created'
        "#,
    )
    .bind(intent_id)
    .bind(txn_id)
    .execute(conn)
    .await?;
    let consumed = result.rows_affected() == 1;
    trace!("🗃️ Intent [{intent_id}] consume attempt against txn [{txn_id}]: consumed={consumed}");
    Ok(consumed)
}
