//! # Payment callback signature format
//!
//! The gateway callback that reports a successful payment is the sole gate between "money moved" and "an order
//! exists", so it must be impossible to forge with knowledge of public values alone. The callback carries a keyed
//! hash computed over the intent id and the gateway transaction id:
//!
//! ```text
//!     signature = hex( HMAC-SHA256( secret, "{intent_id}|{txn_id}" ) )
//! ```
//!
//! where `secret` is a server-held key shared with the gateway and never sent to clients. The server recomputes the
//! signature from its own copy of the ids and compares it to the supplied value without short-circuiting on the
//! first mismatching byte. Any mismatch fails closed: no order may be materialized.

use fcs_common::Secret;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error)]
#[error("Payment signature verification failed: {0}")]
pub struct PaymentVerificationError(pub String);

/// A gateway payment attestation: the intent it pays, the gateway transaction that paid it, and the keyed hash
/// binding the two together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSignature {
    pub intent_id: String,
    pub txn_id: String,
    pub signature: String,
}

impl PaymentSignature {
    pub fn new(intent_id: &str, txn_id: &str, signature: &str) -> Self {
        Self { intent_id: intent_id.to_string(), txn_id: txn_id.to_string(), signature: signature.to_string() }
    }

    /// Create a correctly signed attestation. Used by the gateway side of the contract and by tests.
    pub fn create(intent_id: &str, txn_id: &str, secret: &Secret<String>) -> Self {
        let signature = sign_payment(intent_id, txn_id, secret);
        Self::new(intent_id, txn_id, &signature)
    }

    pub fn message(&self) -> String {
        signature_message(&self.intent_id, &self.txn_id)
    }

    /// Recomputes the expected signature and compares it to the supplied one in constant time.
    pub fn is_valid(&self, secret: &Secret<String>) -> bool {
        let expected = sign_payment(&self.intent_id, &self.txn_id, secret);
        constant_time_eq(&expected, &self.signature.trim().to_ascii_lowercase())
    }

    /// Verify the signature, failing closed with an error suitable for propagation.
    pub fn verify(&self, secret: &Secret<String>) -> Result<(), PaymentVerificationError> {
        if self.is_valid(secret) {
            Ok(())
        } else {
            Err(PaymentVerificationError(format!(
                "signature does not match intent {} / txn {}",
                self.intent_id, self.txn_id
            )))
        }
    }
}

pub fn signature_message(intent_id: &str, txn_id: &str) -> String {
    format!("{intent_id}|{txn_id}")
}

/// The expected signature for the given ids, as lowercase hex.
pub fn sign_payment(intent_id: &str, txn_id: &str, secret: &Secret<String>) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.reveal().as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(signature_message(intent_id, txn_id).as_bytes());
    let digest = mac.finalize().into_bytes();
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut s, b| {
        s.push_str(&format!("{b:02x}"));
        s
    })
}

/// Byte-wise comparison that examines every position regardless of where the first mismatch occurs.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod test {
    use super::*;

    fn secret() -> Secret<String> {
        Secret::new("the-server-held-secret".to_string())
    }

    #[test]
    fn signing_is_symmetric() {
        let sig = PaymentSignature::create("int_123", "txn_456", &secret());
        assert_eq!(sig.message(), "int_123|txn_456");
        assert!(sig.is_valid(&secret()));
        assert_eq!(sig.signature, sign_payment("int_123", "txn_456", &secret()));
    }

    #[test]
    fn any_single_character_mutation_is_rejected() {
        let sig = PaymentSignature::create("int_123", "txn_456", &secret());
        for i in 0..sig.signature.len() {
            let mut tampered = sig.signature.clone();
            let orig = tampered.as_bytes()[i];
            let replacement = if orig == b'0' { '1' } else { '0' };
            tampered.replace_range(i..=i, &replacement.to_string());
            let tampered_sig = PaymentSignature::new("int_123", "txn_456", &tampered);
            assert!(!tampered_sig.is_valid(&secret()), "mutation at index {i} was accepted");
        }
    }

    #[test]
    fn wrong_ids_or_wrong_secret_are_rejected() {
        let sig = PaymentSignature::create("int_123", "txn_456", &secret());
        let other = PaymentSignature::new("int_999", "txn_456", &sig.signature);
        assert!(!other.is_valid(&secret()));
        let other = PaymentSignature::new("int_123", "txn_999", &sig.signature);
        assert!(!other.is_valid(&secret()));
        assert!(!sig.is_valid(&Secret::new("some-other-secret".to_string())));
    }

    #[test]
    fn verify_fails_closed() {
        let sig = PaymentSignature::new("int_123", "txn_456", "deadbeef");
        assert!(sig.verify(&secret()).is_err());
    }
}
