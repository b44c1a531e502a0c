//! Shared fixtures for the engine integration tests: a scratch database per test and a scriptable in-memory
//! payment gateway.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
    Mutex,
};

use chrono::Utc;
use fcs_common::{Money, Secret};
use foodcourt_engine::{
    db_types::CartLine,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{GatewayError, IntentMetadata, PaymentGateway, TransferReceipt},
    SqliteDatabase,
};

pub fn test_secret() -> Secret<String> {
    Secret::new("test-payment-secret".to_string())
}

pub fn cart_line(menu_item_id: i64, quantity: i64) -> CartLine {
    CartLine { menu_item_id, quantity, note: None }
}

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

/// A gateway double that hands out sequential intent and transfer ids. Individual payout destinations can be
/// blocked to script transfer failures.
#[derive(Clone, Default)]
pub struct TestGateway {
    counter: Arc<AtomicU64>,
    blocked_destinations: Arc<Mutex<Vec<String>>>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_destination(&self, destination: &str) {
        self.blocked_destinations.lock().unwrap().push(destination.to_string());
    }
}

impl PaymentGateway for TestGateway {
    async fn create_intent(
        &self,
        _amount: Money,
        _currency: &str,
        _metadata: &IntentMetadata,
    ) -> Result<String, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("pi_test_{n}"))
    }

    async fn transfer(
        &self,
        destination: &str,
        amount: Money,
        _source_txn: &str,
        _metadata: serde_json::Value,
    ) -> Result<TransferReceipt, GatewayError> {
        if self.blocked_destinations.lock().unwrap().iter().any(|d| d == destination) {
            return Err(GatewayError::TransferRejected(format!("destination {destination} is blocked")));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(TransferReceipt { transfer_id: format!("tr_test_{n}"), amount, processed_at: Utc::now() })
    }
}
