//! A development stand-in for the real payment provider.
//!
//! `DevGateway` fabricates intent and transfer ids locally and always accepts transfers. It exists so the server
//! can be stood up end to end without provider credentials; production deployments supply their own
//! [`PaymentGateway`] implementation against the provider's API.
use chrono::Utc;
use fcs_common::Money;
use foodcourt_engine::traits::{GatewayError, IntentMetadata, PaymentGateway, TransferReceipt};
use log::*;
use rand::{distributions::Alphanumeric, Rng};

#[derive(Clone, Default)]
pub struct DevGateway;

impl DevGateway {
    pub fn new() -> Self {
        Self
    }
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect::<String>().to_lowercase()
}

impl PaymentGateway for DevGateway {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<String, GatewayError> {
        let intent_id = format!("pi_dev_{}", random_suffix(16));
        info!(
            "💳️ [dev gateway] Intent [{intent_id}] opened for {amount} {currency} ({} item(s))",
            metadata.item_count
        );
        Ok(intent_id)
    }

    async fn transfer(
        &self,
        destination: &str,
        amount: Money,
        source_txn: &str,
        metadata: serde_json::Value,
    ) -> Result<TransferReceipt, GatewayError> {
        let transfer_id = format!("tr_dev_{}", random_suffix(16));
        info!(
            "🏦️ [dev gateway] Transfer [{transfer_id}] of {amount} to {destination}, funded by [{source_txn}]: \
             {metadata}"
        );
        Ok(TransferReceipt { transfer_id, amount, processed_at: Utc::now() })
    }
}
